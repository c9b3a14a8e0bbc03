//! Count + windowed fetch over a collection

use crate::core::filter::FilterSpec;
use crate::core::query::{PageRequest, PageResult, PaginationMeta, SortSpec};
use crate::core::store::{Collection, FindOptions, Relation};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Executes paginated queries against a [`Collection`]
///
/// The count and the fetch are two independent reads. A write landing
/// between them can make `total` disagree with the fetched window.
pub struct Paginator;

impl Paginator {
    /// Count matches and fetch one window of them
    ///
    /// With `request.all_data()` every match is returned and the pagination
    /// block is `None`. Storage failures propagate unchanged.
    pub async fn paginate<T: DeserializeOwned>(
        source: &dyn Collection,
        filter: &FilterSpec,
        sort: &SortSpec,
        request: PageRequest,
        relations: &[Relation],
    ) -> Result<PageResult<T>> {
        let total = source.count(filter).await?;

        let options = FindOptions::sorted(sort.clone()).populate(relations);
        let options = if request.all_data() {
            options
        } else {
            options.window(request.skip(), request.limit())
        };

        tracing::debug!(
            collection = source.name(),
            total,
            page = request.page(),
            limit = request.limit(),
            all_data = request.all_data(),
            sort = %sort.field,
            "paginating"
        );

        let documents = source.find(filter, &options).await?;
        let data = documents
            .into_iter()
            .map(|doc| {
                serde_json::from_value(doc)
                    .with_context(|| format!("malformed document in '{}'", source.name()))
            })
            .collect::<Result<Vec<T>>>()?;

        let pagination = (!request.all_data())
            .then(|| PaginationMeta::new(request.page(), request.limit(), total));

        Ok(PageResult {
            data,
            total,
            pagination,
        })
    }
}
