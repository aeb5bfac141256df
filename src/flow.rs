//! What the bot should do in response to a button press or a finished request.
//!
//! Everything here is synchronous and touches only the controller, so the
//! session lock can be held for the whole step. `bot` carries out the result.

use teloxide::types::InlineKeyboardMarkup;

use crate::action::Action;
use crate::controller::{Controller, PendingRequest, Resolution};
use crate::db::KeyValueStore;
use crate::error::ApiError;
use crate::recipe::Recipe;
use crate::render::{self, Detail, Screen};

pub const GONE_NOTICE: &str = "That recipe is no longer available. Try searching again.";
pub const OUTDATED_NOTICE: &str = "These results are out of date. Use the newest list.";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Nothing,
    /// Short text shown in the callback answer.
    Notice(&'static str),
    EditKeyboard(InlineKeyboardMarkup),
    EditScreen(Screen),
    SendScreen(Screen),
    ShowDetail(Detail),
    /// Delete the pressed message and its picture, if it has one.
    Delete { photo: Option<i32> },
}

/// What to do with the loading message once its request resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Followup {
    Replace(Screen),
    Discard,
}

pub fn plan<S: KeyValueStore>(controller: &mut Controller<S>, action: Action) -> Outcome {
    match action {
        Action::ToggleFromResults { generation, id } => {
            let recipe = match current_result(controller, generation, &id) {
                Ok(recipe) => recipe,
                Err(notice) => return Outcome::Notice(notice),
            };
            controller.toggle_favorite(&recipe);
            Outcome::EditKeyboard(render::results_keyboard(controller))
        }
        Action::View { generation, id } => {
            let recipe = match current_result(controller, generation, &id) {
                Ok(recipe) => recipe,
                Err(notice) => return Outcome::Notice(notice),
            };
            let detail = render::detail(controller, &recipe);
            controller.open_detail(recipe);
            Outcome::ShowDetail(detail)
        }
        Action::ToggleFromDetail { id, photo } => {
            let Some(recipe) = controller.find_recipe(&id).cloned() else {
                return Outcome::Notice(GONE_NOTICE);
            };
            let favorite = controller.toggle_favorite(&recipe);
            Outcome::EditKeyboard(render::detail_keyboard(&id, favorite, photo))
        }
        Action::RemoveFromShelf(id) => {
            // Already gone (double tap): the shelf on screen is still accurate.
            let Some(recipe) = controller.favorites().find(&id).cloned() else {
                return Outcome::Nothing;
            };
            controller.toggle_favorite(&recipe);
            Outcome::EditScreen(render::shelf(controller))
        }
        Action::LoadFavorite(id) => {
            if controller.load_favorite(&id) {
                Outcome::SendScreen(render::results(controller))
            } else {
                Outcome::Notice(GONE_NOTICE)
            }
        }
        Action::Close { photo } => {
            controller.close_detail();
            Outcome::Delete { photo }
        }
    }
}

fn current_result<S: KeyValueStore>(
    controller: &Controller<S>,
    generation: u64,
    id: &str,
) -> Result<Recipe, &'static str> {
    let view = controller.view();
    if view.generation != generation {
        log::debug!(
            "Press on results generation {} while {} is shown",
            generation,
            view.generation
        );
        return Err(OUTDATED_NOTICE);
    }
    view.results()
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .ok_or(GONE_NOTICE)
}

pub fn settle<S: KeyValueStore>(
    controller: &mut Controller<S>,
    request: &PendingRequest,
    outcome: Result<Vec<Recipe>, ApiError>,
) -> Followup {
    match controller.resolve(request, outcome) {
        Resolution::Stale => Followup::Discard,
        Resolution::Applied | Resolution::Failed => Followup::Replace(render::results(controller)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Modal;
    use crate::db::SqliteStore;

    fn controller() -> Controller<SqliteStore> {
        Controller::hydrate(SqliteStore::open_in_memory().unwrap(), "favs")
    }

    fn searched(c: &mut Controller<SqliteStore>, query: &str, recipes: Vec<Recipe>) {
        let request = c.begin_search(query).unwrap();
        c.resolve(&request, Ok(recipes));
    }

    fn chicken() -> Vec<Recipe> {
        vec![Recipe::new("c1", "Chicken Pie"), Recipe::new("c2", "Chicken Curry")]
    }

    #[test]
    fn toggle_from_results_rekeys_the_current_list() {
        let mut c = controller();
        searched(&mut c, "chicken", chicken());
        let generation = c.view().generation;

        let outcome = plan(
            &mut c,
            Action::ToggleFromResults {
                generation,
                id: "c2".into(),
            },
        );
        assert!(c.is_favorite("c2"));
        assert_eq!(outcome, Outcome::EditKeyboard(render::results_keyboard(&c)));
        let Outcome::EditKeyboard(keyboard) = outcome else {
            unreachable!()
        };
        assert_eq!(keyboard.inline_keyboard[0][0].text, "🤍 Chicken Pie");
        assert_eq!(keyboard.inline_keyboard[1][0].text, "❤️ Chicken Curry");
    }

    #[test]
    fn presses_on_replaced_results_are_rejected() {
        let mut c = controller();
        searched(&mut c, "chicken", chicken());
        let old = c.view().generation;
        c.toggle_favorite(&Recipe::new("c1", "Chicken Pie"));
        searched(&mut c, "beef", vec![Recipe::new("b1", "Beef Stew")]);

        let toggle = plan(
            &mut c,
            Action::ToggleFromResults {
                generation: old,
                id: "c1".into(),
            },
        );
        assert_eq!(toggle, Outcome::Notice(OUTDATED_NOTICE));
        assert!(c.is_favorite("c1"));

        let view = plan(
            &mut c,
            Action::View {
                generation: old,
                id: "c2".into(),
            },
        );
        assert_eq!(view, Outcome::Notice(OUTDATED_NOTICE));
        assert_eq!(c.view().modal, Modal::Closed);
    }

    #[test]
    fn view_opens_the_detail() {
        let mut c = controller();
        searched(&mut c, "chicken", chicken());
        let generation = c.view().generation;

        let outcome = plan(
            &mut c,
            Action::View {
                generation,
                id: "c1".into(),
            },
        );
        let recipe = Recipe::new("c1", "Chicken Pie");
        assert_eq!(outcome, Outcome::ShowDetail(render::detail(&c, &recipe)));
        assert_eq!(c.view().modal, Modal::Open(recipe));
    }

    #[test]
    fn view_of_a_missing_id_is_gone() {
        let mut c = controller();
        searched(&mut c, "chicken", chicken());
        let generation = c.view().generation;
        let outcome = plan(
            &mut c,
            Action::View {
                generation,
                id: "zz".into(),
            },
        );
        assert_eq!(outcome, Outcome::Notice(GONE_NOTICE));
    }

    #[test]
    fn toggle_from_detail_keeps_the_photo_link() {
        let mut c = controller();
        c.open_detail(Recipe::new("7", "Pie"));

        let outcome = plan(
            &mut c,
            Action::ToggleFromDetail {
                id: "7".into(),
                photo: Some(90),
            },
        );
        assert!(c.is_favorite("7"));
        assert_eq!(
            outcome,
            Outcome::EditKeyboard(render::detail_keyboard("7", true, Some(90)))
        );

        let missing = plan(
            &mut c,
            Action::ToggleFromDetail {
                id: "8".into(),
                photo: None,
            },
        );
        assert_eq!(missing, Outcome::Notice(GONE_NOTICE));
    }

    #[test]
    fn remove_from_shelf_edits_only_when_something_changed() {
        let mut c = controller();
        c.toggle_favorite(&Recipe::new("1", "A"));
        c.toggle_favorite(&Recipe::new("2", "B"));

        let outcome = plan(&mut c, Action::RemoveFromShelf("1".into()));
        assert!(!c.is_favorite("1"));
        assert_eq!(outcome, Outcome::EditScreen(render::shelf(&c)));

        assert_eq!(plan(&mut c, Action::RemoveFromShelf("1".into())), Outcome::Nothing);
        assert_eq!(c.favorites().len(), 1);
    }

    #[test]
    fn load_favorite_sends_a_fresh_list() {
        let mut c = controller();
        c.toggle_favorite(&Recipe::new("5", "Corba"));

        let outcome = plan(&mut c, Action::LoadFavorite("5".into()));
        assert_eq!(outcome, Outcome::SendScreen(render::results(&c)));
        assert_eq!(c.view().results(), &[Recipe::new("5", "Corba")]);

        assert_eq!(
            plan(&mut c, Action::LoadFavorite("404".into())),
            Outcome::Notice(GONE_NOTICE)
        );
        assert_eq!(c.view().results(), &[Recipe::new("5", "Corba")]);
    }

    #[test]
    fn close_drops_the_modal() {
        let mut c = controller();
        c.open_detail(Recipe::new("7", "Pie"));
        assert_eq!(
            plan(&mut c, Action::Close { photo: Some(3) }),
            Outcome::Delete { photo: Some(3) }
        );
        assert_eq!(c.view().modal, Modal::Closed);
    }

    #[test]
    fn settle_replaces_the_loading_screen() {
        let mut c = controller();
        let request = c.begin_search("chicken").unwrap();
        assert_eq!(render::results(&c).text, render::escape_markdown(render::LOADING_TEXT));

        let followup = settle(&mut c, &request, Ok(chicken()));
        assert_eq!(followup, Followup::Replace(render::results(&c)));
        assert!(!c.view().is_loading());
    }

    #[test]
    fn settle_after_failure_shows_previous_results() {
        let mut c = controller();
        searched(&mut c, "chicken", chicken());
        let before = render::results(&c);

        let request = c.begin_random();
        let followup = settle(&mut c, &request, Err(ApiError::Request("offline".into())));
        assert_eq!(followup, Followup::Replace(before));
    }

    #[test]
    fn settle_discards_stale_requests() {
        let mut c = controller();
        let first = c.begin_search("chicken").unwrap();
        let second = c.begin_random();

        assert_eq!(settle(&mut c, &first, Ok(chicken())), Followup::Discard);
        assert!(c.view().is_loading());
        assert!(matches!(
            settle(&mut c, &second, Ok(vec![Recipe::new("1", "Pie")])),
            Followup::Replace(_)
        ));
    }
}
