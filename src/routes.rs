//! Routing Table
//!
//! TigerStyle: Routing is a finite table, resolved without touching the store.
//!
//! Resolution order is fixed:
//! 1. Unknown method → 501, whatever the path
//! 2. Collection path `/squirrels` → collection rows
//! 3. Item path `/squirrels/{id}` → item rows
//! 4. Anything else → 404
//!
//! A segment counts as an ID only when it is all ASCII digits and at least 1.
//! Malformed IDs are folded into 404, same as a well-formed ID with no record.

use crate::squirrels::SquirrelId;
use axum::http::Method;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Path segment naming the squirrel collection
pub const COLLECTION_SEGMENT: &str = "squirrels";

/// Smallest ID a path may address
pub const PATH_ID_MIN: SquirrelId = 1;

// =============================================================================
// Types
// =============================================================================

/// Methods the service knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Map an HTTP method onto a known verb
    pub fn from_method(method: &Method) -> Option<Self> {
        match method {
            &Method::GET => Some(Self::Get),
            &Method::POST => Some(Self::Post),
            &Method::PUT => Some(Self::Put),
            &Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A matched route and its path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    List,
    Create,
    Get(SquirrelId),
    Update(SquirrelId),
    Delete(SquirrelId),
}

/// Outcome of routing one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched(Route),
    NotFound,
    NotImplemented,
}

/// Shape of a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    Collection,
    Item(SquirrelId),
    Unmatched,
}

// =============================================================================
// Table
// =============================================================================

const COLLECTION_ROUTES: &[(Verb, Route)] = &[
    (Verb::Get, Route::List),
    (Verb::Post, Route::Create),
];

type ItemRoute = fn(SquirrelId) -> Route;

const ITEM_ROUTES: &[(Verb, ItemRoute)] = &[
    (Verb::Get, Route::Get as ItemRoute),
    (Verb::Put, Route::Update as ItemRoute),
    (Verb::Delete, Route::Delete as ItemRoute),
];

/// Resolve a request to a route, a 404 or a 501
pub fn resolve(method: &Method, path: &str) -> Resolution {
    let Some(verb) = Verb::from_method(method) else {
        return Resolution::NotImplemented;
    };

    let route = match PathShape::parse(path) {
        PathShape::Collection => COLLECTION_ROUTES
            .iter()
            .find(|(v, _)| *v == verb)
            .map(|(_, route)| *route),
        PathShape::Item(id) => ITEM_ROUTES
            .iter()
            .find(|(v, _)| *v == verb)
            .map(|(_, route)| route(id)),
        PathShape::Unmatched => None,
    };

    route.map_or(Resolution::NotFound, Resolution::Matched)
}

impl PathShape {
    /// Classify a path (without query string)
    pub fn parse(path: &str) -> Self {
        let Some(rest) = path.strip_prefix('/') else {
            return Self::Unmatched;
        };

        let mut segments = rest.split('/');
        if segments.next() != Some(COLLECTION_SEGMENT) {
            return Self::Unmatched;
        }

        match (segments.next(), segments.next()) {
            (None, _) => Self::Collection,
            (Some(segment), None) => parse_id(segment).map_or(Self::Unmatched, Self::Item),
            (Some(_), Some(_)) => Self::Unmatched,
        }
    }
}

/// Parse an ID path segment: ASCII digits only, value at least 1.
///
/// Digit strings beyond `u64` cannot name a stored record and are rejected.
pub fn parse_id(segment: &str) -> Option<SquirrelId> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment
        .parse::<SquirrelId>()
        .ok()
        .filter(|id| *id >= PATH_ID_MIN)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows() {
        assert_eq!(
            resolve(&Method::GET, "/squirrels"),
            Resolution::Matched(Route::List)
        );
        assert_eq!(
            resolve(&Method::POST, "/squirrels"),
            Resolution::Matched(Route::Create)
        );
        assert_eq!(
            resolve(&Method::GET, "/squirrels/7"),
            Resolution::Matched(Route::Get(7))
        );
        assert_eq!(
            resolve(&Method::PUT, "/squirrels/7"),
            Resolution::Matched(Route::Update(7))
        );
        assert_eq!(
            resolve(&Method::DELETE, "/squirrels/7"),
            Resolution::Matched(Route::Delete(7))
        );
    }

    #[test]
    fn test_known_method_on_wrong_shape_is_not_found() {
        assert_eq!(resolve(&Method::POST, "/squirrels/1"), Resolution::NotFound);
        assert_eq!(resolve(&Method::PUT, "/squirrels"), Resolution::NotFound);
        assert_eq!(resolve(&Method::DELETE, "/squirrels"), Resolution::NotFound);
        assert_eq!(resolve(&Method::GET, "/unknown"), Resolution::NotFound);
        assert_eq!(resolve(&Method::GET, "/"), Resolution::NotFound);
        assert_eq!(resolve(&Method::GET, "/squirrels/1/details"), Resolution::NotFound);
        assert_eq!(resolve(&Method::GET, "/squirrels/"), Resolution::NotFound);
        assert_eq!(resolve(&Method::GET, "/squirrelsx"), Resolution::NotFound);
    }

    #[test]
    fn test_unknown_method_is_not_implemented_everywhere() {
        for path in ["/unknown", "/squirrels", "/squirrels/1", "/squirrels/1/x"] {
            assert_eq!(resolve(&Method::PATCH, path), Resolution::NotImplemented);
            assert_eq!(resolve(&Method::HEAD, path), Resolution::NotImplemented);
            assert_eq!(resolve(&Method::OPTIONS, path), Resolution::NotImplemented);
        }
    }

    #[test]
    fn test_malformed_ids_fold_into_not_found() {
        for segment in ["invalid", "-1", "0", "1.5", "+1", " 1", "1e3", "", "00"] {
            assert_eq!(parse_id(segment), None, "segment {:?}", segment);
            let path = format!("/squirrels/{}", segment);
            assert_eq!(resolve(&Method::GET, &path), Resolution::NotFound, "path {:?}", path);
        }
    }

    #[test]
    fn test_id_bounds() {
        assert_eq!(parse_id("1"), Some(1));
        assert_eq!(parse_id("01"), Some(1));
        assert_eq!(parse_id("999999999"), Some(999_999_999));
        assert_eq!(parse_id("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_id("18446744073709551616"), None);
    }
}
