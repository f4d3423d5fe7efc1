// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Canonical request helpers shared by both signature schemes.

use crate::Result;
use http::uri::PathAndQuery;
use http::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::str::FromStr;

/// Characters that stay as-is: `A-Z a-z 0-9 - _ . ~`.
pub const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Same as [`UNRESERVED`] but keeps `/` for object key paths.
pub const PATH_UNRESERVED: &AsciiSet = &UNRESERVED.remove(b'/');

/// Percent encode input with the unreserved set.
///
/// Space becomes `%20`, `*` becomes `%2A` and `~` is kept.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// Percent encode an object key for use in a path, keeping `/`.
pub fn percent_encode_path(s: &str) -> String {
    utf8_percent_encode(s, PATH_UNRESERVED).to_string()
}

/// Build the canonical query string.
///
/// Pairs are sorted by key in byte order, both sides are percent encoded and
/// joined as `k=v` with `&`. Empty values are kept as `k=`.
///
/// ```
/// use alicloud_core::request::canonical_query;
///
/// let s = canonical_query([("b", "2"), ("a", "x y"), ("c", "")]);
/// assert_eq!(s, "a=x%20y&b=2&c=");
/// ```
pub fn canonical_query<'a>(params: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut pairs: Vec<(&str, &str)> = params.into_iter().collect();
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut s = String::with_capacity(pairs.len() * 16);
    for (idx, (k, v)) in pairs.into_iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.push_str(&percent_encode(k));
        s.push('=');
        s.push_str(&percent_encode(v));
    }
    s
}

/// Parse a raw query string into percent decoded pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Replace the query of the request, keeping scheme, authority and path.
///
/// `query` must already be encoded. An empty query removes the `?`.
pub fn set_query(parts: &mut http::request::Parts, query: &str) -> Result<()> {
    let mut uri = std::mem::take(&mut parts.uri).into_parts();
    let path = uri
        .path_and_query
        .as_ref()
        .map(|v| v.path().to_string())
        .unwrap_or_else(|| "/".to_string());

    let paq = if query.is_empty() {
        path
    } else {
        format!("{path}?{query}")
    };
    uri.path_and_query = Some(PathAndQuery::from_str(&paq)?);
    parts.uri = Uri::from_parts(uri)?;
    Ok(())
}
