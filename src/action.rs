use std::fmt;
use std::str::FromStr;

use crate::error::UnknownAction;

/// What an inline keyboard button asks for, carried as its callback data.
///
/// Result-list buttons carry the generation of the list they were rendered
/// for. `photo` is the id of the picture message sent alongside a detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ToggleFromResults { generation: u64, id: String },
    View { generation: u64, id: String },
    ToggleFromDetail { id: String, photo: Option<i32> },
    RemoveFromShelf(String),
    LoadFavorite(String),
    Close { photo: Option<i32> },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ToggleFromResults { generation, id } => write!(f, "rf:{generation}:{id}"),
            Action::View { generation, id } => write!(f, "v:{generation}:{id}"),
            Action::ToggleFromDetail { id, photo: None } => write!(f, "df:{id}"),
            Action::ToggleFromDetail {
                id,
                photo: Some(photo),
            } => write!(f, "df:{id}:{photo}"),
            Action::RemoveFromShelf(id) => write!(f, "sr:{id}"),
            Action::LoadFavorite(id) => write!(f, "l:{id}"),
            Action::Close { photo: None } => write!(f, "x"),
            Action::Close { photo: Some(photo) } => write!(f, "x:{photo}"),
        }
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownAction(data.to_string());
        let parts: Vec<&str> = data.split(':').collect();
        if parts.iter().skip(1).any(|part| part.is_empty()) {
            return Err(unknown());
        }
        let generation = |raw: &str| raw.parse::<u64>().map_err(|_| unknown());
        let photo = |raw: &str| raw.parse::<i32>().map_err(|_| unknown());

        match parts.as_slice() {
            ["rf", n, id] => Ok(Action::ToggleFromResults {
                generation: generation(*n)?,
                id: id.to_string(),
            }),
            ["v", n, id] => Ok(Action::View {
                generation: generation(*n)?,
                id: id.to_string(),
            }),
            ["df", id] => Ok(Action::ToggleFromDetail {
                id: id.to_string(),
                photo: None,
            }),
            ["df", id, msg] => Ok(Action::ToggleFromDetail {
                id: id.to_string(),
                photo: Some(photo(*msg)?),
            }),
            ["sr", id] => Ok(Action::RemoveFromShelf(id.to_string())),
            ["l", id] => Ok(Action::LoadFavorite(id.to_string())),
            ["x"] => Ok(Action::Close { photo: None }),
            ["x", msg] => Ok(Action::Close {
                photo: Some(photo(*msg)?),
            }),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_actions_parse_back() {
        let actions = [
            Action::ToggleFromResults {
                generation: 3,
                id: "52977".into(),
            },
            Action::View {
                generation: 0,
                id: "52977".into(),
            },
            Action::ToggleFromDetail {
                id: "1".into(),
                photo: None,
            },
            Action::ToggleFromDetail {
                id: "1".into(),
                photo: Some(812),
            },
            Action::RemoveFromShelf("2".into()),
            Action::LoadFavorite("3".into()),
            Action::Close { photo: None },
            Action::Close { photo: Some(77) },
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn unknown_data_is_rejected() {
        for data in ["", "zz:1", "v:", "v:1", "v:one:2", "rf:1:", "x:", "x:abc", "close", "sr:1:2"] {
            assert_eq!(data.parse::<Action>(), Err(UnknownAction(data.to_string())));
        }
    }

    #[test]
    fn encodings_fit_telegram_limit() {
        let id = "9".repeat(20);
        let longest = [
            Action::ToggleFromResults {
                generation: u64::MAX,
                id: id.clone(),
            }
            .to_string(),
            Action::ToggleFromDetail {
                id,
                photo: Some(i32::MAX),
            }
            .to_string(),
        ];
        for data in longest {
            assert!(data.len() <= 64, "{data} is too long");
        }
    }
}
