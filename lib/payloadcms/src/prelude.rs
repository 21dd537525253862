//! Prelude module for convenient imports.
//!
//! ```ignore
//! use payloadcms::prelude::*;
//! ```

pub use crate::{
    Client, ClientBuilder, Collection, Decoded, Error, Global, ListParams, ListResponse,
    MediaOptions, Method, QueryBuilder, RequestOption, Response, Result, Transport,
};
pub use serde::{Deserialize, Serialize};
