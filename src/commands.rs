/// Available commands, autocomplete and parsing

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "list",
    aliases: &["l", "ls", "transactions"],
    usage: "list",
    description: "Show transactions for the current filter",
  },
  Command {
    name: "employees",
    aliases: &["e", "emp"],
    usage: "employees",
    description: "Show the employee filter choices",
  },
  Command {
    name: "filter",
    aliases: &["f", "select"],
    usage: "filter <employee-id|all>",
    description: "Filter transactions by employee",
  },
  Command {
    name: "more",
    aliases: &["m", "next"],
    usage: "more",
    description: "Load the next page of transactions",
  },
  Command {
    name: "approve",
    aliases: &["a", "ok"],
    usage: "approve <transaction-id>",
    description: "Mark a transaction approved",
  },
  Command {
    name: "reject",
    aliases: &["r", "unapprove"],
    usage: "reject <transaction-id>",
    description: "Mark a transaction not approved",
  },
  Command {
    name: "refresh",
    aliases: &["reload"],
    usage: "refresh",
    description: "Discard cached data and fetch again",
  },
  Command {
    name: "help",
    aliases: &["h", "?"],
    usage: "help [command]",
    description: "Show commands, or those matching a prefix",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Exit txreview",
  },
];

/// Parsed user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  List,
  Employees,
  /// `None` selects all employees
  Filter(Option<String>),
  More,
  Approval { transaction_id: String, value: bool },
  Refresh,
  /// Empty filter lists every command
  Help(String),
  Quit,
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }
  ranked(input).into_iter().map(|(cmd, _)| cmd).collect()
}

/// Matching commands with their priority, best first
fn ranked(input: &str) -> Vec<(&'static Command, u32)> {
  let input_lower = input.to_lowercase();
  let mut matches: Vec<(&'static Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);
  matches
}

/// Resolve a word to a single command. A partial match must be the only
/// one at its priority.
fn resolve(word: &str) -> Result<&'static Command, String> {
  let matches = ranked(word);
  let Some(&(best, priority)) = matches.first() else {
    return Err(format!("Unknown command '{}'. Type 'help' for commands.", word));
  };

  let tied: Vec<&str> = matches
    .iter()
    .take_while(|(_, p)| *p == priority)
    .map(|(cmd, _)| cmd.name)
    .collect();
  if tied.len() > 1 {
    return Err(format!("Ambiguous command '{}': {}", word, tied.join(", ")));
  }
  Ok(best)
}

/// Parse an input line into an action. Errors are user-facing messages.
pub fn parse(input: &str) -> Result<Action, String> {
  let mut words = input.split_whitespace();
  let Some(word) = words.next() else {
    return Ok(Action::List);
  };
  let argument = words.next().map(str::to_string);

  let cmd = resolve(word)?;

  let require = |arg: Option<String>| arg.ok_or_else(|| format!("Usage: {}", cmd.usage));

  match cmd.name {
    "list" => Ok(Action::List),
    "employees" => Ok(Action::Employees),
    "filter" => {
      let id = require(argument)?;
      if id.eq_ignore_ascii_case("all") {
        Ok(Action::Filter(None))
      } else {
        Ok(Action::Filter(Some(id)))
      }
    }
    "more" => Ok(Action::More),
    "approve" => Ok(Action::Approval {
      transaction_id: require(argument)?,
      value: true,
    }),
    "reject" => Ok(Action::Approval {
      transaction_id: require(argument)?,
      value: false,
    }),
    "refresh" => Ok(Action::Refresh),
    "help" => Ok(Action::Help(argument.unwrap_or_default())),
    "quit" => Ok(Action::Quit),
    other => Err(format!("Command '{}' is not wired up", other)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("filter");
    assert_eq!(suggestions[0].name, "filter");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("q");
    assert_eq!(suggestions[0].name, "quit");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("emp");
    assert_eq!(suggestions[0].name, "employees");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("prov");
    assert_eq!(suggestions[0].name, "approve");
  }

  #[test]
  fn test_parse_filter() {
    assert_eq!(parse("filter 7"), Ok(Action::Filter(Some("7".to_string()))));
    assert_eq!(parse("f ALL"), Ok(Action::Filter(None)));
    assert_eq!(parse("filter"), Err("Usage: filter <employee-id|all>".to_string()));
  }

  #[test]
  fn test_parse_approval() {
    assert_eq!(
      parse("approve t1"),
      Ok(Action::Approval {
        transaction_id: "t1".to_string(),
        value: true
      })
    );
    assert_eq!(
      parse("reject t1"),
      Ok(Action::Approval {
        transaction_id: "t1".to_string(),
        value: false
      })
    );
  }

  #[test]
  fn test_parse_misc() {
    assert_eq!(parse(""), Ok(Action::List));
    assert_eq!(parse("  more "), Ok(Action::More));
    assert_eq!(parse("refresh"), Ok(Action::Refresh));
    assert_eq!(parse("?"), Ok(Action::Help(String::new())));
    assert_eq!(parse("help re"), Ok(Action::Help("re".to_string())));
    assert!(parse("zzz").is_err());
  }

  #[test]
  fn test_partial_match_must_be_unique() {
    assert_eq!(parse("re"), Err("Ambiguous command 're': reject, refresh".to_string()));
    assert_eq!(parse("ref"), Ok(Action::Refresh));
    assert_eq!(
      parse("rej t1"),
      Ok(Action::Approval {
        transaction_id: "t1".to_string(),
        value: false
      })
    );
  }
}
