use anyhow::{Context, Result};
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use weather_core::SearchAndDisplayController;

use crate::render;

const HELP: &str = "`/` search on/off, type a city to search, a number to pick it, `q` to quit";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    ToggleSearch,
    Select(usize),
    Search(String),
    Ignored,
}

/// Map one line of stdin to a screen action.
///
/// Numbers pick a candidate (1-based) and free text is search input, both only
/// while the search box is open.
fn parse_input(line: &str, search_open: bool) -> Input {
    let line = line.trim();
    match line {
        "q" | ":q" | "quit" => Input::Quit,
        "/" => Input::ToggleSearch,
        "" => Input::Ignored,
        _ if !search_open => Input::Ignored,
        _ => match line.parse::<usize>() {
            Ok(n) if n >= 1 => Input::Select(n - 1),
            _ => Input::Search(line.to_string()),
        },
    }
}

/// Interactive screen: mount, then redraw on every state change until `q` or EOF.
pub async fn run(ctrl: SearchAndDisplayController) -> Result<()> {
    let mut updates = ctrl.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    print!("{}", render::screen(&ctrl.state(), Local::now().date_naive()));

    {
        let ctrl = ctrl.clone();
        tokio::spawn(async move { ctrl.mount().await });
    }

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                println!();
                print!("{}", render::screen(&state, Local::now().date_naive()));
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };

                match parse_input(&line, ctrl.state().show_search) {
                    Input::Quit => break,
                    Input::ToggleSearch => ctrl.toggle_search(),
                    Input::Select(idx) => {
                        let ctrl = ctrl.clone();
                        tokio::spawn(async move {
                            if !ctrl.select_candidate(idx).await {
                                println!("No candidate #{}", idx + 1);
                            }
                        });
                    }
                    Input::Search(text) => ctrl.on_search_text(text),
                    Input::Ignored => {}
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_work_with_search_closed() {
        assert_eq!(parse_input("q", false), Input::Quit);
        assert_eq!(parse_input(" / ", false), Input::ToggleSearch);
        assert_eq!(parse_input("London", false), Input::Ignored);
        assert_eq!(parse_input("2", false), Input::Ignored);
    }

    #[test]
    fn open_search_takes_text_and_numbers() {
        assert_eq!(parse_input("Lon", true), Input::Search("Lon".to_string()));
        assert_eq!(parse_input("1", true), Input::Select(0));
        assert_eq!(parse_input("0", true), Input::Search("0".to_string()));
        assert_eq!(parse_input("  ", true), Input::Ignored);
        assert_eq!(parse_input(":q", true), Input::Quit);
    }
}
