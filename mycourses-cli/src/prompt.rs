use std::io;

use mycourses::credentials::Prompt;

/// Asks on the terminal without echoing the answer, since it is a secret.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, instructions: &str, question: &str) -> io::Result<String> {
        println!("{instructions}");
        rpassword::prompt_password(format!("{question}: "))
    }
}
