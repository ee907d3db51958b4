//! Slash commands: `/start`, `/help`, `/settings`, `/add_enhancer`.

/// Commands registered with the platform, with their menu descriptions.
pub const COMMANDS: &[(&str, &str)] = &[
    ("start", "Welcome message"),
    ("help", "How to use the bot"),
    ("settings", "Manage custom enhancers"),
    ("add_enhancer", "Add a custom enhancer: name|description|prompt"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Settings,
    /// Raw argument string after the command name.
    AddEnhancer(String),
}

impl Command {
    /// Parse a message starting with `/`. Returns `None` for text that is
    /// not one of our commands. A `@botname` suffix on the command is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let rest = trimmed.strip_prefix('/')?;
        let (head, args) = match rest.find(char::is_whitespace) {
            Some(i) => (&rest[..i], rest[i..].trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "settings" => Some(Command::Settings),
            "add_enhancer" => Some(Command::AddEnhancer(args.to_string())),
            _ => None,
        }
    }
}

/// Validated `/add_enhancer` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnhancer {
    pub name: String,
    pub description: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddEnhancerError {
    #[error("no arguments given")]
    Empty,
    #[error("need at least a name and a prompt")]
    TooFewParts,
    #[error("name must not be blank")]
    BlankName,
    #[error("prompt must not be blank")]
    BlankPrompt,
}

/// Parse `name|prompt` or `name|description|prompt`.
///
/// With three or more parts everything after the second `|` is the prompt,
/// so prompts may themselves contain `|`.
pub fn parse_add_enhancer(args: &str) -> Result<NewEnhancer, AddEnhancerError> {
    let args = args.trim();
    if args.is_empty() {
        return Err(AddEnhancerError::Empty);
    }

    let parts: Vec<&str> = args.splitn(3, '|').collect();
    let (name, description, prompt) = match parts.as_slice() {
        [name, prompt] => (*name, None, *prompt),
        [name, description, prompt] => (*name, Some(*description), *prompt),
        _ => return Err(AddEnhancerError::TooFewParts),
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(AddEnhancerError::BlankName);
    }
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AddEnhancerError::BlankPrompt);
    }
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(NewEnhancer {
        name: name.to_string(),
        description,
        prompt: prompt.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /help  "), Some(Command::Help));
        assert_eq!(Command::parse("/settings@PromptEnhancerBot"), Some(Command::Settings));
        assert_eq!(Command::parse("/SETTINGS"), Some(Command::Settings));
    }

    #[test]
    fn add_enhancer_keeps_raw_args() {
        assert_eq!(
            Command::parse("/add_enhancer Formal | Business | Rewrite formally"),
            Some(Command::AddEnhancer("Formal | Business | Rewrite formally".into()))
        );
        assert_eq!(
            Command::parse("/add_enhancer"),
            Some(Command::AddEnhancer(String::new()))
        );
    }

    #[test]
    fn unknown_commands_and_plain_text_are_none() {
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("hello /start"), None);
        assert_eq!(Command::parse("start"), None);
    }

    #[test]
    fn two_parts_are_name_and_prompt() {
        let e = parse_add_enhancer("Short|Make it shorter").unwrap();
        assert_eq!(e.name, "Short");
        assert_eq!(e.description, None);
        assert_eq!(e.prompt, "Make it shorter");
    }

    #[test]
    fn three_parts_include_description() {
        let e = parse_add_enhancer(" Formal | Business tone | Rewrite formally ").unwrap();
        assert_eq!(
            e,
            NewEnhancer {
                name: "Formal".into(),
                description: Some("Business tone".into()),
                prompt: "Rewrite formally".into(),
            }
        );
    }

    #[test]
    fn prompt_may_contain_pipes() {
        let e = parse_add_enhancer("Table|Markdown|Use | as column separator").unwrap();
        assert_eq!(e.prompt, "Use | as column separator");
    }

    #[test]
    fn blank_description_becomes_none() {
        let e = parse_add_enhancer("Formal||Rewrite formally").unwrap();
        assert_eq!(e.description, None);
    }

    #[test]
    fn invalid_arguments() {
        assert_eq!(parse_add_enhancer(""), Err(AddEnhancerError::Empty));
        assert_eq!(parse_add_enhancer("just a name"), Err(AddEnhancerError::TooFewParts));
        assert_eq!(parse_add_enhancer(" |prompt"), Err(AddEnhancerError::BlankName));
        assert_eq!(parse_add_enhancer("name| "), Err(AddEnhancerError::BlankPrompt));
        assert_eq!(parse_add_enhancer("name|desc| "), Err(AddEnhancerError::BlankPrompt));
    }
}
