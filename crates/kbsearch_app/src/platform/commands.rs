//! Parsing of REPL input lines.

use kbsearch_core::FilterField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Free text: becomes the query and is submitted.
    Query(String),
    /// Empty line: submit whatever is in the input (e.g. a picked history row).
    SubmitPending,
    ShowHistory,
    /// 1-based index into the history list.
    PickHistory(usize),
    /// 1-based index into the example prompts.
    PickExample(usize),
    /// 1-based index into the results shown for the latest answer.
    Preview(usize),
    ClosePreview,
    Filter {
        field: FilterField,
        value: Option<String>,
    },
    ShowFacets,
    Login {
        username: String,
        password: String,
    },
    Help,
    Quit,
}

pub const HELP: &str = "\
  <text>                  search
  (empty line)            submit the current input
  :history                list recent queries
  :h <n>                  copy history entry <n> into the input
  :ex <n>                 copy example <n> into the input
  :p <n>                  preview result <n> of the latest answer
  :close                  close the preview
  :filter <field> [value] set or clear application|issue|ingredient
  :facets                 list known filter values
  :login <user> <pass>    sign in
  :quit";

pub fn parse(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Command::SubmitPending);
    }
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Ok(Command::Query(trimmed.to_string()));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    match name {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "help" | "?" => Ok(Command::Help),
        "history" => Ok(Command::ShowHistory),
        "h" => index_arg(words.next()).map(Command::PickHistory),
        "ex" => index_arg(words.next()).map(Command::PickExample),
        "p" | "preview" => index_arg(words.next()).map(Command::Preview),
        "close" => Ok(Command::ClosePreview),
        "facets" => Ok(Command::ShowFacets),
        "filter" => {
            let field = match words.next() {
                Some("application") => FilterField::Application,
                Some("issue") => FilterField::Issue,
                Some("ingredient") => FilterField::Ingredient,
                other => return Err(format!("unknown filter field {:?}", other.unwrap_or(""))),
            };
            let value = words.collect::<Vec<_>>().join(" ");
            Ok(Command::Filter {
                field,
                value: Some(value).filter(|value| !value.is_empty()),
            })
        }
        "login" => match (words.next(), words.next()) {
            (Some(username), Some(password)) => Ok(Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err("usage: :login <user> <password>".to_string()),
        },
        other => Err(format!("unknown command :{other} (try :help)")),
    }
}

fn index_arg(raw: Option<&str>) -> Result<usize, String> {
    match raw.map(str::parse::<usize>) {
        Some(Ok(n)) if n >= 1 => Ok(n),
        _ => Err("expected a number starting at 1".to_string()),
    }
}
