//! Success response helpers. Documents are returned bare, without an envelope.

use crate::document::Document;
use axum::{http::StatusCode, Json};

pub fn ok_one(doc: Document) -> (StatusCode, Json<Document>) {
    (StatusCode::OK, Json(doc))
}

pub fn created(doc: Document) -> (StatusCode, Json<Document>) {
    (StatusCode::CREATED, Json(doc))
}

pub fn ok_many(docs: Vec<Document>) -> (StatusCode, Json<Vec<Document>>) {
    (StatusCode::OK, Json(docs))
}
