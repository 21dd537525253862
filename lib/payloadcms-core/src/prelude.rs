//! Prelude module for convenient imports.
//!
//! ```ignore
//! use payloadcms_core::prelude::*;
//! ```

pub use crate::{
    Collection, Decoded, Error, Global, ListParams, ListResponse, Method, Operator, QueryBuilder,
    RequestOption, Response, Result, Transport,
};
