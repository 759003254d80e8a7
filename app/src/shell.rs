//! Line-oriented shell composing the create form and the task list.

use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use todo_core::{CreateForm, ItemView, ListView, TodoContext, Transport};
use tracing::debug;

pub const TITLE: &str = "Things to do";

pub const HELP: &str = "\
commands:
  add <text>     create a task
  toggle <n>     flip task n between done and in progress
  rm <n>         delete task n
  ls             refetch the list
  help           show this help
  quit           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Toggle(usize),
    Remove(usize),
    List,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`; try `help`")]
    Unknown(String),
    #[error("`{0}` needs a task number")]
    MissingIndex(&'static str),
    #[error("`{0}` is not a task number")]
    BadIndex(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match verb {
            "add" | "a" => Ok(Command::Add(rest.to_string())),
            "toggle" | "t" => parse_index("toggle", rest).map(Command::Toggle),
            "rm" | "del" | "d" => parse_index("rm", rest).map(Command::Remove),
            "ls" | "" => Ok(Command::List),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_index(verb: &'static str, raw: &str) -> Result<usize, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingIndex(verb));
    }
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::BadIndex(raw.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<T> {
    form: CreateForm<T>,
    list: ListView<T>,
    notice: Option<String>,
}

impl<T: Transport + 'static> Shell<T> {
    pub fn mount(ctx: &TodoContext<T>) -> Self {
        Self {
            form: CreateForm::new(ctx),
            list: ListView::mount(ctx),
            notice: None,
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("{TITLE}\n\n{}\n\n{}\n", self.form.render(), self.list.render());
        if let Some(notice) = &self.notice {
            out.push_str(&format!("\n{notice}\n"));
        }
        out
    }

    /// Apply one command and wait for the resulting refetch.
    pub async fn handle(&mut self, command: Command) -> Flow {
        debug!(?command, "shell command");
        self.notice = None;
        match command {
            Command::Add(text) => {
                self.form.set_text(text);
                // Failures render inside the form.
                let _ = self.form.submit().await;
            }
            Command::Toggle(n) => {
                if let Some(item) = self.item(n) {
                    // Failures render on the row.
                    let _ = item.toggle().await;
                }
            }
            Command::Remove(n) => {
                // The row may leave the list on refetch, so report here too.
                if let Some(item) = self.item(n) {
                    if let Err(err) = item.delete().await {
                        self.notice = Some(format!("delete #{n} failed: {err}"));
                    }
                }
            }
            Command::List => self.list.refresh(),
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Quit => return Flow::Quit,
        }
        self.list.settled().await;
        Flow::Continue
    }

    /// Read commands from `input` until EOF or `quit`, rendering after each.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.list.settled().await;
        output.write_all(self.render().as_bytes()).await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match line.parse::<Command>() {
                Ok(command) => {
                    if self.handle(command).await == Flow::Quit {
                        break;
                    }
                }
                Err(err) => self.notice = Some(err.to_string()),
            }
            output.write_all(self.render().as_bytes()).await?;
            output.flush().await?;
        }
        Ok(())
    }

    fn item(&mut self, n: usize) -> Option<Arc<ItemView<T>>> {
        let mut items = self.list.items();
        if n == 0 || n > items.len() {
            self.notice = Some(format!("no task #{n}"));
            return None;
        }
        Some(items.swap_remove(n - 1))
    }
}
