pub mod router;
pub mod routes;
