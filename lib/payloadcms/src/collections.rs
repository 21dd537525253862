//! Collection endpoints: `/api/{collection}`.

use std::fmt::Display;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Client, Decoded, ListParams, Method, RequestOption, Response, Result, Transport, path};

/// Document CRUD on a collection.
///
/// Obtained from [`Client::collections`]. Document ids are formatted with
/// [`Display`], so numeric and string ids both work.
#[derive(Debug)]
pub struct Collections<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T> Collections<'a, T> {
    pub(crate) const fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }
}

impl<T: Transport> Collections<'_, T> {
    /// `GET /api/{collection}/{id}`
    pub async fn find_by_id<D: DeserializeOwned>(
        &self,
        collection: impl AsRef<str>,
        id: impl Display,
        options: &[RequestOption],
    ) -> Result<Decoded<D>> {
        let path = path::document(collection.as_ref(), id);
        self.client
            .execute_json::<D, ()>(Method::Get, &path, None, options)
            .await
    }

    /// `GET /api/{collection}/slug/{slug}`
    pub async fn find_by_slug<D: DeserializeOwned>(
        &self,
        collection: impl AsRef<str>,
        slug: &str,
        options: &[RequestOption],
    ) -> Result<Decoded<D>> {
        let path = path::slug(collection.as_ref(), slug);
        self.client
            .execute_json::<D, ()>(Method::Get, &path, None, options)
            .await
    }

    /// `GET /api/{collection}?<params>`
    ///
    /// Decode into [`crate::ListResponse`] to get the paging fields.
    pub async fn list<D: DeserializeOwned>(
        &self,
        collection: impl AsRef<str>,
        params: &ListParams,
        options: &[RequestOption],
    ) -> Result<Decoded<D>> {
        let path = format!("{}{}", path::collection(collection.as_ref()), params.encode());
        self.client
            .execute_json::<D, ()>(Method::Get, &path, None, options)
            .await
    }

    /// `POST /api/{collection}`
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        collection: impl AsRef<str>,
        document: &B,
        options: &[RequestOption],
    ) -> Result<Response> {
        let path = path::collection(collection.as_ref());
        self.client
            .execute(Method::Post, &path, Some(document), options)
            .await
    }

    /// `PATCH /api/{collection}/{id}`
    pub async fn update_by_id<B: Serialize + ?Sized>(
        &self,
        collection: impl AsRef<str>,
        id: impl Display,
        document: &B,
        options: &[RequestOption],
    ) -> Result<Response> {
        let path = path::document(collection.as_ref(), id);
        self.client
            .execute(Method::Patch, &path, Some(document), options)
            .await
    }

    /// `DELETE /api/{collection}/{id}`
    pub async fn delete_by_id(
        &self,
        collection: impl AsRef<str>,
        id: impl Display,
        options: &[RequestOption],
    ) -> Result<Response> {
        let path = path::document(collection.as_ref(), id);
        self.client
            .execute::<()>(Method::Delete, &path, None, options)
            .await
    }
}
