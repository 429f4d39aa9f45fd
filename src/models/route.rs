use std::fmt;

/// Where the front end should go after an operation completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Chat(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Login => write!(f, "/login"),
            Route::Chat(id) => write!(f, "/chats/{}", id),
        }
    }
}
