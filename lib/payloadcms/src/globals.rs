//! Global endpoints: `/api/globals/{global}`.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Client, Decoded, Method, RequestOption, Response, Result, Transport, path};

/// Read and update singleton documents. Obtained from [`Client::globals`].
#[derive(Debug)]
pub struct Globals<'a, T> {
    client: &'a Client<T>,
}

impl<'a, T> Globals<'a, T> {
    pub(crate) const fn new(client: &'a Client<T>) -> Self {
        Self { client }
    }
}

impl<T: Transport> Globals<'_, T> {
    /// `GET /api/globals/{global}`
    pub async fn get<D: DeserializeOwned>(
        &self,
        global: impl AsRef<str>,
        options: &[RequestOption],
    ) -> Result<Decoded<D>> {
        let path = path::global(global.as_ref());
        self.client
            .execute_json::<D, ()>(Method::Get, &path, None, options)
            .await
    }

    /// `POST /api/globals/{global}`
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        global: impl AsRef<str>,
        document: &B,
        options: &[RequestOption],
    ) -> Result<Response> {
        let path = path::global(global.as_ref());
        self.client
            .execute(Method::Post, &path, Some(document), options)
            .await
    }
}
