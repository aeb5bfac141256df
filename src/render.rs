//! Turns controller state into MarkdownV2 messages and inline keyboards.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::action::Action;
use crate::controller::{ingredients_of, Controller, ResultSource};
use crate::db::KeyValueStore;
use crate::recipe::Recipe;

pub const LOADING_TEXT: &str = "Loading recipes...";
pub const NO_RESULTS_TEXT: &str = "No recipes found. Try searching for something else!";
pub const READY_TEXT: &str =
    "Ready to cook? Search for recipes or try the random recipe button!";
pub const NO_FAVORITES_TEXT: &str =
    "You have no favorite recipes yet. Tap 🤍 next to a recipe to save it.";

// Telegram rejects messages over 4096 characters.
const MAX_INSTRUCTIONS_CHARS: usize = 2500;

static SPECIAL_CHARACTERS: [char; 19] = [
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.',
    '!',
];

pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL_CHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c)
    }
    escaped
}

/// A message body plus the buttons attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

fn button(text: impl Into<String>, action: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.to_string())
}

fn heart(favorite: bool) -> &'static str {
    if favorite {
        "❤️"
    } else {
        "🤍"
    }
}

/// The result list, or the loading/empty placeholder.
pub fn results<S: KeyValueStore>(controller: &Controller<S>) -> Screen {
    let view = controller.view();
    let placeholder = if view.is_loading() {
        Some(LOADING_TEXT)
    } else {
        match &view.results {
            None => Some(READY_TEXT),
            Some(recipes) if recipes.is_empty() => Some(NO_RESULTS_TEXT),
            Some(_) => None,
        }
    };
    if let Some(text) = placeholder {
        return Screen {
            text: escape_markdown(text),
            keyboard: InlineKeyboardMarkup::default(),
        };
    }

    let recipes = view.results();
    let mut text = match &view.source {
        Some(ResultSource::Search(query)) => {
            format!("*Recipes for “{}”*\n", escape_markdown(query))
        }
        Some(ResultSource::Random) => "*Random recipe*\n".to_string(),
        Some(ResultSource::Favorite) => "*From your favorites*\n".to_string(),
        None => "*Recipes*\n".to_string(),
    };
    for (i, recipe) in recipes.iter().enumerate() {
        text.push_str(&format!("{}\\. {}\n", i + 1, escape_markdown(&recipe.name)));
    }
    Screen {
        text,
        keyboard: results_keyboard(controller),
    }
}

/// Buttons for the current result list, tagged with its generation.
pub fn results_keyboard<S: KeyValueStore>(controller: &Controller<S>) -> InlineKeyboardMarkup {
    let generation = controller.view().generation;
    let rows = controller.view().results().iter().map(|recipe| {
        vec![
            button(
                format!("{} {}", heart(controller.is_favorite(&recipe.id)), recipe.name),
                Action::ToggleFromResults {
                    generation,
                    id: recipe.id.clone(),
                },
            ),
            button(
                "View Recipe",
                Action::View {
                    generation,
                    id: recipe.id.clone(),
                },
            ),
        ]
    });
    InlineKeyboardMarkup::new(rows)
}

/// A detail view: an optional picture sent first, then the text with buttons.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub recipe_id: String,
    pub photo_url: Option<String>,
    pub text: String,
    pub favorite: bool,
}

impl Detail {
    /// `photo` is the id of the picture message, once it has been sent.
    pub fn keyboard(&self, photo: Option<i32>) -> InlineKeyboardMarkup {
        detail_keyboard(&self.recipe_id, self.favorite, photo)
    }
}

/// Full recipe: name, ingredients and instructions, plus the picture URL.
pub fn detail<S: KeyValueStore>(controller: &Controller<S>, recipe: &Recipe) -> Detail {
    let mut text = format!("*{}*\n", escape_markdown(&recipe.name));

    text.push_str("\n*Ingredients:*\n");
    for ingredient in ingredients_of(recipe) {
        text.push_str(&format!("• {}\n", escape_markdown(&ingredient.to_string())));
    }

    text.push_str("\n*Instructions:*\n");
    let instructions = recipe.instructions.as_deref().unwrap_or("").trim();
    text.push_str(&escape_markdown(&truncate(instructions, MAX_INSTRUCTIONS_CHARS)));

    Detail {
        recipe_id: recipe.id.clone(),
        photo_url: recipe
            .thumbnail_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
        text,
        favorite: controller.is_favorite(&recipe.id),
    }
}

pub fn detail_keyboard(recipe_id: &str, favorite: bool, photo: Option<i32>) -> InlineKeyboardMarkup {
    let save = if favorite { "Remove Favorite" } else { "Save Recipe" };
    InlineKeyboardMarkup::new([[
        button(
            save,
            Action::ToggleFromDetail {
                id: recipe_id.to_string(),
                photo,
            },
        ),
        button("× Close", Action::Close { photo }),
    ]])
}

/// The favorites shelf: load or remove each entry.
pub fn shelf<S: KeyValueStore>(controller: &Controller<S>) -> Screen {
    let favorites = controller.favorites();
    if favorites.is_empty() {
        return Screen {
            text: escape_markdown(NO_FAVORITES_TEXT),
            keyboard: InlineKeyboardMarkup::default(),
        };
    }
    let rows = favorites.iter().map(|recipe| {
        vec![
            button(recipe.name.clone(), Action::LoadFavorite(recipe.id.clone())),
            button("✕", Action::RemoveFromShelf(recipe.id.clone())),
        ]
    });
    Screen {
        text: "*Your Favorite Recipes:*".to_string(),
        keyboard: InlineKeyboardMarkup::new(rows),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
