//! Inline-button action tokens.
//!
//! | Token                                      | Meaning                       |
//! |--------------------------------------------|-------------------------------|
//! | `enhance:<kind>:<user_id>[:<enhancer_id>]` | apply an enhancement          |
//! | `add_enhancer`                             | show `/add_enhancer` usage    |
//! | `remove_enhancer:<id>`                     | delete a custom enhancer      |
//! | `back_to_main`                             | return to the main prompt     |

use std::fmt;

use enhancer_core::types::EnhancementKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Enhance {
        kind: EnhancementKind,
        user_id: i64,
        /// Present for custom enhancements.
        enhancer_id: Option<String>,
    },
    AddEnhancer,
    RemoveEnhancer { id: String },
    BackToMain,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized action token: {0}")]
pub struct ActionParseError(pub String);

impl Action {
    pub fn parse(token: &str) -> Result<Self, ActionParseError> {
        let err = || ActionParseError(token.to_string());

        match token {
            "add_enhancer" => return Ok(Action::AddEnhancer),
            "back_to_main" => return Ok(Action::BackToMain),
            _ => {}
        }

        if let Some(id) = token.strip_prefix("remove_enhancer:") {
            if id.is_empty() {
                return Err(err());
            }
            return Ok(Action::RemoveEnhancer { id: id.to_string() });
        }

        if let Some(rest) = token.strip_prefix("enhance:") {
            let mut parts = rest.splitn(3, ':');
            let kind: EnhancementKind = parts
                .next()
                .and_then(|k| k.parse().ok())
                .ok_or_else(err)?;
            let user_id: i64 = parts
                .next()
                .and_then(|u| u.parse().ok())
                .ok_or_else(err)?;
            let enhancer_id = parts.next().filter(|id| !id.is_empty()).map(str::to_string);
            return Ok(Action::Enhance {
                kind,
                user_id,
                enhancer_id,
            });
        }

        Err(err())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Enhance {
                kind,
                user_id,
                enhancer_id: Some(id),
            } => write!(f, "enhance:{kind}:{user_id}:{id}"),
            Action::Enhance {
                kind,
                user_id,
                enhancer_id: None,
            } => write!(f, "enhance:{kind}:{user_id}"),
            Action::AddEnhancer => f.write_str("add_enhancer"),
            Action::RemoveEnhancer { id } => write!(f, "remove_enhancer:{id}"),
            Action::BackToMain => f.write_str("back_to_main"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builtin_enhance() {
        assert_eq!(
            Action::parse("enhance:grammar:123").unwrap(),
            Action::Enhance {
                kind: EnhancementKind::Grammar,
                user_id: 123,
                enhancer_id: None
            }
        );
    }

    #[test]
    fn parses_custom_enhance_with_id() {
        assert_eq!(
            Action::parse("enhance:custom:42:custom_2").unwrap(),
            Action::Enhance {
                kind: EnhancementKind::Custom,
                user_id: 42,
                enhancer_id: Some("custom_2".into())
            }
        );
    }

    #[test]
    fn custom_without_id_parses_with_none() {
        // The router answers this with an invalid-selection message.
        let a = Action::parse("enhance:custom:42").unwrap();
        assert!(matches!(a, Action::Enhance { enhancer_id: None, .. }));
    }

    #[test]
    fn admin_tokens() {
        assert_eq!(Action::parse("add_enhancer").unwrap(), Action::AddEnhancer);
        assert_eq!(Action::parse("back_to_main").unwrap(), Action::BackToMain);
        assert_eq!(
            Action::parse("remove_enhancer:custom_3").unwrap(),
            Action::RemoveEnhancer {
                id: "custom_3".into()
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        for token in [
            "",
            "enhance",
            "enhance:spelling:1",
            "enhance:grammar:abc",
            "enhance:grammar",
            "remove_enhancer:",
            "settings",
        ] {
            assert!(Action::parse(token).is_err(), "{token:?} should not parse");
        }
    }

    #[test]
    fn display_is_inverse_of_parse() {
        for token in [
            "enhance:prompt_enhancement:-1001",
            "enhance:custom:7:custom_1",
            "add_enhancer",
            "remove_enhancer:custom_9",
            "back_to_main",
        ] {
            assert_eq!(Action::parse(token).unwrap().to_string(), token);
        }
    }
}
