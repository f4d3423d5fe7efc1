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

use crate::{Error, ErrorKind, Result};
use async_trait::async_trait;
use log::debug;
use std::collections::VecDeque;
use std::fmt::{self, Debug};

/// ListItem is an entry returned by a marker based listing.
pub trait ListItem {
    /// The key the next page should start after if this is the last item.
    fn marker(&self) -> &str;
}

/// One page returned by a [`PageSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items of this page in service order.
    pub items: Vec<T>,
    /// More pages exist after this one.
    pub truncated: bool,
}

/// PageSource issues one list request.
///
/// `marker` is exclusive: the page must start strictly after the named key.
/// `page_size` is a hint only, sources may return any number of items.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Item type returned by this source.
    type Item: ListItem + Send + 'static;

    /// Fetch the page following `marker`, `None` means the first page.
    async fn fetch_page(&self, marker: Option<&str>, page_size: usize)
        -> Result<Page<Self::Item>>;
}

/// Cursor captures where a listing stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Key of the last emitted item, `None` if nothing was emitted yet.
    pub marker: Option<String>,
    /// More items may follow.
    pub truncated: bool,
}

impl Cursor {
    /// Cursor pointing at the beginning of a listing.
    pub fn start() -> Self {
        Self {
            marker: None,
            truncated: true,
        }
    }
}

/// Lister turns a [`PageSource`] into a lazy sequence of items.
///
/// Pages are fetched on demand. After a truncated page the next request
/// continues from the key of the last emitted item; the listing ends on the
/// first page that is not truncated.
pub struct Lister<S: PageSource> {
    source: S,
    page_size: usize,
    marker: Option<String>,
    buffer: VecDeque<S::Item>,
    done: bool,
}

impl<S: PageSource> Debug for Lister<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lister")
            .field("page_size", &self.page_size)
            .field("marker", &self.marker)
            .field("buffered", &self.buffer.len())
            .field("done", &self.done)
            .finish()
    }
}

impl<S: PageSource> Lister<S> {
    /// Create a lister starting at the beginning.
    pub fn new(source: S, page_size: usize) -> Self {
        Self::resume(source, page_size, Cursor::start())
    }

    /// Continue a listing from a captured cursor.
    ///
    /// Given no concurrent mutation of the listed collection, the resumed
    /// lister yields exactly the items the original one had not emitted yet.
    pub fn resume(source: S, page_size: usize, cursor: Cursor) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            marker: cursor.marker,
            buffer: VecDeque::new(),
            done: !cursor.truncated,
        }
    }

    /// Current position of this lister.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            marker: self.marker.clone(),
            truncated: !(self.done && self.buffer.is_empty()),
        }
    }

    /// Return the next item, fetching a new page if needed.
    pub async fn next(&mut self) -> Result<Option<S::Item>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                self.marker = Some(item.marker().to_string());
                return Ok(Some(item));
            }
            if self.done {
                return Ok(None);
            }
            self.fetch().await?;
        }
    }

    /// Drain the remaining items.
    pub async fn collect_all(mut self) -> Result<Vec<S::Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    async fn fetch(&mut self) -> Result<()> {
        let page = self
            .source
            .fetch_page(self.marker.as_deref(), self.page_size)
            .await?;
        debug!(
            "fetched page after marker {:?}: {} items, truncated: {}",
            self.marker,
            page.items.len(),
            page.truncated
        );

        if page.truncated {
            match page.items.last() {
                None => {
                    return Err(Error::new(
                        ErrorKind::Protocol,
                        "service returned an empty page marked as truncated",
                    ))
                }
                Some(last) if Some(last.marker()) == self.marker.as_deref() => {
                    return Err(Error::new(
                        ErrorKind::Protocol,
                        format!("listing did not advance past marker {}", last.marker()),
                    ))
                }
                Some(_) => {}
            }
        }

        self.done = !page.truncated;
        self.buffer.extend(page.items);
        Ok(())
    }
}
