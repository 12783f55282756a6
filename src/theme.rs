//! Backdrop selection for route paths.

/// Visual backdrop variants for the app's screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    /// Plain surface used by the login and signup screens.
    Plain,
    /// Gradient used by the chat view.
    Gradient,
    /// Muted surface for instructor and quiz configuration screens.
    Muted,
}

/// Map a route path to its backdrop. Pure function of the path string;
/// trailing slashes and unknown routes fall back to the chat gradient.
pub fn backdrop_for_path(path: &str) -> Backdrop {
    let path = path.trim_end_matches('/');
    match path {
        "/login" | "/signup" => Backdrop::Plain,
        p if p.starts_with("/instructor") || p.starts_with("/quiz") => Backdrop::Muted,
        _ => Backdrop::Gradient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_routes_are_plain() {
        assert_eq!(backdrop_for_path("/login"), Backdrop::Plain);
        assert_eq!(backdrop_for_path("/signup/"), Backdrop::Plain);
    }

    #[test]
    fn test_instructor_and_quiz_routes_are_muted() {
        assert_eq!(backdrop_for_path("/instructor/policy"), Backdrop::Muted);
        assert_eq!(backdrop_for_path("/quiz"), Backdrop::Muted);
    }

    #[test]
    fn test_chat_and_unknown_routes_use_gradient() {
        assert_eq!(backdrop_for_path("/"), Backdrop::Gradient);
        assert_eq!(backdrop_for_path("/chat"), Backdrop::Gradient);
        assert_eq!(backdrop_for_path("/anything-else"), Backdrop::Gradient);
    }
}
