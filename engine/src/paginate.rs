/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use serde_json::Value;
use sta_query::{
    build_url,
    response::{count, is_collection, nested_next_link_key, next_link},
    EntityKind, PagedResult, Query,
};
use tokio::sync::watch;
use tracing::instrument;
use url::Url;

use crate::{Error, Result, Transport};

#[derive(Clone, Debug)]
pub struct PageOptions {
    /// Page size requested when the query sets no `$top`.
    pub default_page_size: u64,
    /// Upper bound on the number of top-level pages.
    pub max_pages: Option<usize>,
    /// Aborts the fetch before the next request once it reads `true`.
    pub cancel: Option<watch::Receiver<bool>>,
}

/// Fetches every page of a query, following continuation links.
pub struct Paginator<'a, T> {
    transport: &'a T,
    options: PageOptions,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_pages: None,
            cancel: None,
        }
    }
}

impl<'a, T: Transport> Paginator<'a, T> {
    pub fn new(transport: &'a T, options: PageOptions) -> Self {
        Self { transport, options }
    }

    #[instrument(skip(self, query), fields(entity = %query.entity, id = query.entity_id))]
    pub async fn fetch_all(&self, base: &str, query: &Query) -> Result<PagedResult> {
        let result = if query.free_form().is_some() {
            self.fetch_once(base, query).await?
        } else if query.entity_id.is_some() {
            self.fetch_entity(base, query).await?
        } else {
            self.fetch_collection(base, query).await?
        };
        log::info!(
            "fetched {} item(s) in {} page(s)",
            result.items.len(),
            result.pages
        );
        Ok(result)
    }

    /// Free-form expressions are sent as given, without pagination.
    async fn fetch_once(&self, base: &str, query: &Query) -> Result<PagedResult> {
        let url = Url::parse(&build_url(base, query))?;
        let mut payload = self.get(&url).await?;
        Ok(match is_collection(&payload) {
            true => {
                let total = count(&payload);
                let items = take_items(&mut payload);
                PagedResult {
                    total_count: total.unwrap_or(items.len() as u64),
                    items,
                    pages: 1,
                    single: false,
                }
            }
            false if payload.as_object().is_some_and(|obj| !obj.is_empty()) => {
                PagedResult::single(payload)
            }
            false => PagedResult {
                pages: 1,
                ..PagedResult::default()
            },
        })
    }

    async fn fetch_entity(&self, base: &str, query: &Query) -> Result<PagedResult> {
        let url = Url::parse(&build_url(base, query))?;
        let mut entity = self.get(&url).await?;
        if !entity.is_object() {
            log::debug!("ignoring malformed entity payload from {url}");
            return Ok(PagedResult {
                pages: 1,
                ..PagedResult::default()
            });
        }
        self.drain_observations(&url, &mut entity).await?;
        Ok(PagedResult::single(entity))
    }

    async fn fetch_collection(&self, base: &str, query: &Query) -> Result<PagedResult> {
        let explicit_top = query.top.is_some();
        let mut query = query.clone();
        if query.top.is_none() {
            query.top = Some(self.options.default_page_size);
        }

        let mut request = Url::parse(&build_url(base, &query))?;
        let mut items = Vec::new();
        let mut total = None;
        let mut pages = 0;

        loop {
            let mut payload = self.get(&request).await?;
            pages += 1;
            if !is_collection(&payload) {
                log::debug!("stopping pagination at malformed page {pages}");
                break;
            }
            if pages == 1 {
                total = count(&payload);
            }

            let next = next_link(&payload)
                .map(|link| request.join(link))
                .transpose()?;
            let page = take_items(&mut payload);
            if page.is_empty() {
                log::debug!("stopping pagination at empty page {pages}");
                break;
            }
            for mut entity in page {
                self.drain_observations(&request, &mut entity).await?;
                items.push(entity);
            }

            match next {
                Some(_) if explicit_top => break,
                Some(_) if self.options.max_pages.is_some_and(|max| pages >= max) => {
                    log::info!("stopping pagination after {pages} page(s): page limit reached");
                    break;
                }
                Some(next) => request = next,
                None => break,
            }
        }

        Ok(PagedResult {
            total_count: total.unwrap_or(items.len() as u64),
            items,
            pages,
            single: false,
        })
    }

    /// Follow the continuation link of an entity's expanded Observations
    /// until the nested collection is complete.
    async fn drain_observations(&self, origin: &Url, entity: &mut Value) -> Result<()> {
        let Some(obj) = entity.as_object_mut() else {
            return Ok(());
        };
        let name = EntityKind::Observations.plural();
        let key = nested_next_link_key(name);
        let mut origin = origin.clone();

        while let Some(link) = obj.remove(&key) {
            let Some(link) = link.as_str() else {
                break;
            };
            let url = origin.join(link)?;
            let mut page = self.get(&url).await?;
            if !is_collection(&page) {
                log::debug!("stopping nested pagination at malformed page from {url}");
                break;
            }

            let next = next_link(&page).map(str::to_string);
            let nested = take_items(&mut page);
            if nested.is_empty() {
                log::debug!("stopping nested pagination at empty page from {url}");
                break;
            }
            match obj
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(observations) => observations.extend(nested),
                other => *other = Value::Array(nested),
            }
            if let Some(next) = next {
                obj.insert(key.clone(), Value::String(next));
            }
            origin = url;
        }

        Ok(())
    }

    async fn get(&self, url: &Url) -> Result<Value> {
        if self
            .options
            .cancel
            .as_ref()
            .is_some_and(|cancel| *cancel.borrow())
        {
            return Err(Error::Cancelled);
        }

        log::debug!("GET {url}");
        let response = self.transport.get(url).await?;
        match response.is_success() {
            true => Ok(response.data),
            false => Err(Error::Status {
                status: response.status,
                message: response.message(),
            }),
        }
    }
}

fn take_items(payload: &mut Value) -> Vec<Value> {
    match payload.get_mut("value").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
