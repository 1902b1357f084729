//! Line-oriented command parsing.

/// A fully parsed user command. Credentials are prompted separately, so
/// the commands only carry what arrived on the line itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { url: String },
    Logout,
    List,
    View,
    Register,
    Average { professor_code: String, module_code: String },
    Rate {
        professor_code: String,
        module_code: String,
        year: String,
        semester: String,
        rating: String,
    },
    Exit,
}

pub const USAGE: &str = "Available commands:
  login <url>                                        log into the service at <url>
  logout                                             log out of the current session
  list                                               list all module instances and who teaches them
  view                                               view the rating of every professor
  average <professor_code> <module_code>             view a professor's average rating in a module
  rate <professor_code> <module_code> <year> <semester> <rating>
                                                     rate a professor for one module instance
  register                                           register a new account
  exit                                               quit";

/// Parses one input line. Blank lines yield `Ok(None)`; anything
/// unrecognized or of the wrong arity is an error carrying the usage text.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(verb) = parts.first() else {
        return Ok(None);
    };

    let command = match (verb.to_ascii_lowercase().as_str(), parts.len()) {
        ("login", 2) => Command::Login {
            url: parts[1].to_owned(),
        },
        ("logout", 1) => Command::Logout,
        ("list", 1) => Command::List,
        ("view", 1) => Command::View,
        ("register", 1) => Command::Register,
        ("average", 3) => Command::Average {
            professor_code: parts[1].to_owned(),
            module_code: parts[2].to_owned(),
        },
        ("rate", 6) => Command::Rate {
            professor_code: parts[1].to_owned(),
            module_code: parts[2].to_owned(),
            year: parts[3].to_owned(),
            semester: parts[4].to_owned(),
            rating: parts[5].to_owned(),
        },
        ("exit", 1) => Command::Exit,
        _ => return Err(USAGE.to_owned()),
    };
    Ok(Some(command))
}
