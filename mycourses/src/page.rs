//! Course page extraction.
//!
//! Matching is best effort: the portal theme decides the markup, so every
//! field may come out empty without that being an error.

use select::{
    document::Document,
    node::Node,
    predicate::{Attr, Class, Name, Predicate},
};
use tracing::debug;

use crate::{
    util::{clean_text, document_text, find_either},
    Summary,
};

/// How many activity names are listed; the rest are only counted.
pub const ACTIVITY_LIMIT: usize = 10;

/// How much of the page text goes into the summary.
pub const TEXT_PREVIEW_CHARS: usize = 500;

/// Fields scraped from a course page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoursePage {
    /// Contents of `<title>`.
    pub title: Option<String>,
    /// The first `h1`, or the page header block.
    pub course_name: Option<String>,
    /// Number of `li.section` elements in the main region.
    pub section_count: usize,
    /// Titles of the sections that have one.
    pub sections: Vec<String>,
    /// Number of `li.activity` elements in the main region.
    pub activity_count: usize,
    /// Names of the first [`ACTIVITY_LIMIT`] activities.
    pub activities: Vec<String>,
    /// Number of forum posts shown on the page.
    pub announcement_count: usize,
    /// All text of the page, whitespace collapsed.
    pub text: String,
    /// Length of the raw HTML in characters.
    pub html_len: usize,
}

impl CoursePage {
    /// Scrape `html`.
    #[must_use]
    pub fn extract(html: &str) -> Self {
        let doc = Document::from(html);

        let mut page = Self {
            title: doc.find(Name("title")).next().map(|n| clean_text(&n)),
            course_name: doc
                .find(Name("h1"))
                .next()
                .or_else(|| {
                    doc.find(Name("div").and(Class("page-header-headings")))
                        .next()
                })
                .map(|n| clean_text(&n)),
            announcement_count: doc
                .find(Name("div").and(Class("forum-post-display")))
                .count(),
            text: document_text(&doc),
            html_len: html.chars().count(),
            ..Self::default()
        };

        let main = doc
            .find(Name("div").and(Attr("id", "region-main")))
            .next()
            .or_else(|| doc.find(Name("main")).next());

        match main {
            Some(main) => page.scrape_main(&main),
            None => debug!("no main region found"),
        }

        page
    }

    fn scrape_main(&mut self, main: &Node) {
        let sections = main
            .find(Name("li").and(Class("section")))
            .collect::<Vec<_>>();

        self.section_count = sections.len();
        self.sections = sections
            .iter()
            .filter_map(|s| find_either(s, Name("h3"), Name("span").and(Class("sectionname"))))
            .map(|n| clean_text(&n))
            .collect();

        let activities = main
            .find(Name("li").and(Class("activity")))
            .collect::<Vec<_>>();

        self.activity_count = activities.len();
        self.activities = activities
            .iter()
            .take(ACTIVITY_LIMIT)
            .filter_map(|a| a.find(Name("span").and(Class("instancename"))).next())
            .map(|n| clean_text(&n))
            .collect();
    }

    /// Activities that were counted but not named.
    #[must_use]
    pub fn omitted_activities(&self) -> usize {
        self.activity_count.saturating_sub(ACTIVITY_LIMIT)
    }

    /// The beginning of the page text.
    #[must_use]
    pub fn text_preview(&self) -> String {
        let mut preview = self.text.chars().take(TEXT_PREVIEW_CHARS).collect::<String>();
        preview.push_str("...");
        preview
    }

    /// The fields as a printable summary.
    #[must_use]
    pub fn summarize(&self) -> Summary {
        let mut summary = Summary::new("PAGE CONTENT");

        if let Some(title) = &self.title {
            summary.push("Page Title", title);
        }
        if let Some(name) = &self.course_name {
            summary.push("Course Name", name);
        }

        if self.section_count > 0 {
            summary.push("Sections", self.section_count.to_string());
            for title in &self.sections {
                summary.push("Section", title);
            }
        }

        if self.activity_count > 0 {
            summary.push("Activities", self.activity_count.to_string());
            for name in &self.activities {
                summary.push("Activity", name);
            }
            if self.omitted_activities() > 0 {
                summary.push("More activities", self.omitted_activities().to_string());
            }
        }

        if self.announcement_count > 0 {
            summary.push("Announcements", self.announcement_count.to_string());
        }

        summary
            .push("Text preview", self.text_preview())
            .push("HTML length", format!("{} characters", self.html_len));

        summary
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write;

    use super::*;

    fn course_html(activities: usize) -> String {
        let mut items = String::new();
        for i in 1..=activities {
            write!(
                items,
                r#"<li class="activity resource modtype_resource">
                     <div><a href="/mod/resource/view.php?id={i}">
                       <span class="instancename">Lecture slides {i} <span class="accesshide">File</span></span>
                     </a></div>
                   </li>"#
            )
            .unwrap();
        }

        format!(
            r#"<!DOCTYPE html>
            <html>
              <head><title>Course: Programming Studio A | MyCourses</title></head>
              <body>
                <header><h1>  Programming Studio A  </h1></header>
                <div id="region-main">
                  <ul class="topics">
                    <li class="section main clearfix"><h3 class="sectionname">General</h3>
                      <ul>{items}</ul>
                    </li>
                    <li class="section main"><span class="sectionname">Week 1</span></li>
                    <li class="section main"><div>no title here</div></li>
                  </ul>
                </div>
                <div class="forum-post-display">Welcome!</div>
                <div class="forum-post-display">Exercise 1 released</div>
              </body>
            </html>"#
        )
    }

    #[test]
    fn extracts_title_and_course_name() {
        let page = CoursePage::extract(&course_html(1));

        assert_eq!(page.title.as_deref(), Some("Course: Programming Studio A | MyCourses"));
        assert_eq!(page.course_name.as_deref(), Some("Programming Studio A"));
    }

    #[test]
    fn extracts_sections() {
        let page = CoursePage::extract(&course_html(1));

        assert_eq!(page.section_count, 3);
        assert_eq!(page.sections, ["General", "Week 1"]);
    }

    #[test]
    fn caps_activity_names_at_ten() {
        let page = CoursePage::extract(&course_html(12));

        assert_eq!(page.activity_count, 12);
        assert_eq!(page.activities.len(), 10);
        assert_eq!(page.activities[0], "Lecture slides 1 File");
        assert_eq!(page.activities[9], "Lecture slides 10 File");
        assert_eq!(page.omitted_activities(), 2);

        let summary = page.summarize();
        assert_eq!(summary.values("Activity").count(), 10);
        assert_eq!(summary.get("Activities"), Some("12"));
        assert_eq!(summary.get("More activities"), Some("2"));
    }

    #[test]
    fn ten_activities_omit_nothing() {
        let page = CoursePage::extract(&course_html(10));

        assert_eq!(page.omitted_activities(), 0);
        assert_eq!(page.summarize().get("More activities"), None);
    }

    #[test]
    fn counts_announcements() {
        let page = CoursePage::extract(&course_html(0));
        assert_eq!(page.announcement_count, 2);
    }

    #[test]
    fn falls_back_to_main_and_header_block() {
        let html = r#"<html><body>
            <div class="page-header-headings"><h2>Databases</h2></div>
            <main><ul><li class="activity"><span class="instancename">Quiz</span></li></ul></main>
        </body></html>"#;

        let page = CoursePage::extract(html);

        assert_eq!(page.course_name.as_deref(), Some("Databases"));
        assert_eq!(page.activities, ["Quiz"]);
    }

    #[test]
    fn login_page_yields_empty_fields() {
        let page = CoursePage::extract("<html><body><form><input name=username></form></body></html>");

        assert_eq!(page.title, None);
        assert_eq!(page.section_count, 0);
        assert_eq!(page.activity_count, 0);

        let summary = page.summarize();
        assert_eq!(summary.get("Sections"), None);
        assert!(summary.get("HTML length").is_some());
    }

    #[test]
    fn text_preview_is_capped() {
        let body = "word ".repeat(200);
        let page = CoursePage::extract(&format!("<html><body><p>{body}</p></body></html>"));

        let preview = page.text_preview();
        assert_eq!(preview.chars().count(), TEXT_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }
}
