/// Middleware modules for the API server
///
/// Authentication is not a layer here: handlers declare it with the
/// `AuthContext` extractor from `taskgate-shared`.

pub mod security;
