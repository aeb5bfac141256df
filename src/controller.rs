use crate::api::RecipeApi;
use crate::db::KeyValueStore;
use crate::error::ApiError;
use crate::favorites::Favorites;
use crate::recipe::{Ingredient, Recipe};

pub type RequestId = u64;

/// The detail view. The selected recipe only exists while it is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Modal {
    #[default]
    Closed,
    Open(Recipe),
}

/// Where the current result list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSource {
    Search(String),
    Random,
    Favorite,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub query: String,
    /// `None` until the first request completes.
    pub results: Option<Vec<Recipe>>,
    pub source: Option<ResultSource>,
    /// Bumped every time `results` is replaced.
    pub generation: u64,
    /// Id of the request currently awaited, if any.
    pub pending: Option<RequestId>,
    pub modal: Modal,
}

impl ViewState {
    fn replace_results(&mut self, recipes: Vec<Recipe>, source: ResultSource) {
        self.results = Some(recipes);
        self.source = Some(source);
        self.generation += 1;
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn results(&self) -> &[Recipe] {
        self.results.as_deref().unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&Recipe> {
        match &self.modal {
            Modal::Open(recipe) => Some(recipe),
            Modal::Closed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Search(String),
    Random,
}

/// A request that has been issued but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub kind: RequestKind,
}

impl PendingRequest {
    pub async fn run<A: RecipeApi + ?Sized>(&self, api: &A) -> Result<Vec<Recipe>, ApiError> {
        match &self.kind {
            RequestKind::Search(query) => api.search(query).await,
            RequestKind::Random => api.random().await.map(|recipe| vec![recipe]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Failed,
    /// A newer request was issued in the meantime; the outcome was dropped.
    Stale,
}

/// Display lines for a recipe's ingredient list.
pub fn ingredients_of(recipe: &Recipe) -> Vec<Ingredient> {
    recipe.ingredients()
}

/// View state and favorites for one user.
pub struct Controller<S> {
    view: ViewState,
    favorites: Favorites<S>,
    last_request: RequestId,
}

impl<S: KeyValueStore> Controller<S> {
    pub fn new(favorites: Favorites<S>) -> Self {
        Controller {
            view: ViewState::default(),
            favorites,
            last_request: 0,
        }
    }

    pub fn hydrate(store: S, key: impl Into<String>) -> Self {
        Self::new(Favorites::load(store, key))
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn favorites(&self) -> &Favorites<S> {
        &self.favorites
    }

    fn issue(&mut self, kind: RequestKind) -> PendingRequest {
        self.last_request += 1;
        self.view.pending = Some(self.last_request);
        PendingRequest {
            id: self.last_request,
            kind,
        }
    }

    /// Starts a search. Blank queries are ignored and issue nothing.
    pub fn begin_search(&mut self, query: &str) -> Option<PendingRequest> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.view.query = query.to_string();
        Some(self.issue(RequestKind::Search(query.to_string())))
    }

    pub fn begin_random(&mut self) -> PendingRequest {
        self.issue(RequestKind::Random)
    }

    /// Applies the outcome of `request` if it is still the latest one.
    pub fn resolve(
        &mut self,
        request: &PendingRequest,
        outcome: Result<Vec<Recipe>, ApiError>,
    ) -> Resolution {
        if self.view.pending != Some(request.id) {
            log::debug!("Dropping stale response for request {}", request.id);
            return Resolution::Stale;
        }
        self.view.pending = None;
        match outcome {
            Ok(recipes) => {
                log::debug!("Request {} returned {} recipes", request.id, recipes.len());
                let source = match &request.kind {
                    RequestKind::Search(query) => ResultSource::Search(query.clone()),
                    RequestKind::Random => ResultSource::Random,
                };
                self.view.replace_results(recipes, source);
                Resolution::Applied
            }
            Err(e) => {
                log::error!("Error fetching recipes ({:?}): {}", request.kind, e);
                Resolution::Failed
            }
        }
    }

    pub async fn search<A: RecipeApi + ?Sized>(&mut self, api: &A, query: &str) -> Option<Resolution> {
        let request = self.begin_search(query)?;
        let outcome = request.run(api).await;
        Some(self.resolve(&request, outcome))
    }

    pub async fn fetch_random<A: RecipeApi + ?Sized>(&mut self, api: &A) -> Resolution {
        let request = self.begin_random();
        let outcome = request.run(api).await;
        self.resolve(&request, outcome)
    }

    pub fn open_detail(&mut self, recipe: Recipe) {
        self.view.modal = Modal::Open(recipe);
    }

    pub fn close_detail(&mut self) {
        self.view.modal = Modal::Closed;
    }

    /// Returns whether the recipe is a favorite after the toggle.
    pub fn toggle_favorite(&mut self, recipe: &Recipe) -> bool {
        self.favorites.toggle(recipe)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Shows a single favorite as the result list. Unknown ids change nothing.
    pub fn load_favorite(&mut self, id: &str) -> bool {
        match self.favorites.find(id) {
            Some(recipe) => {
                let recipe = recipe.clone();
                self.view.replace_results(vec![recipe], ResultSource::Favorite);
                true
            }
            None => false,
        }
    }

    /// Looks `id` up in the open detail, the results, then the favorites.
    pub fn find_recipe(&self, id: &str) -> Option<&Recipe> {
        self.view
            .selected()
            .filter(|r| r.id == id)
            .or_else(|| self.view.results().iter().find(|r| r.id == id))
            .or_else(|| self.favorites.find(id))
    }
}
