use std::{
    collections::VecDeque,
    future::Future,
    marker::PhantomData,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures_core::Stream;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    backend::{PageRequest, QueryPage, StoreBackend},
    error::Result,
    query::Predicate,
    Document,
};

/// A `Cursor` streams the results of a query. When a page of results is exhausted and more
/// remain, the `Cursor` fetches the next page from the store, and so forth until the results
/// run out. The page size is configured through the `max_item_count` field of
/// [`QueryOptions`](crate::options::QueryOptions).
///
/// `Cursor` implements [`futures_core::Stream`], so it is drained with the `StreamExt`/
/// `TryStreamExt` combinators:
///
/// ```rust
/// # use serde::Deserialize;
/// # #[derive(Deserialize)]
/// # struct Family { #[serde(rename = "LastName")] last_name: String }
/// # async fn demo(collection: docstore::Collection<Family>) -> docstore::error::Result<()> {
/// use docstore::query::Predicate;
/// use futures_util::TryStreamExt;
///
/// let mut cursor = collection
///     .find(Predicate::eq("LastName", "Andersen"), None)
///     .await?;
/// while let Some(family) = cursor.try_next().await? {
///     println!("read {}", family.last_name);
/// }
/// # Ok(())
/// # }
/// ```
///
/// Each yielded document is deserialized into the cursor's type parameter; a document that
/// does not fit the type surfaces as a [`Serialization`](crate::error::ErrorKind::Serialization)
/// error for that item, after which the cursor continues with the next one.
pub struct Cursor<T> {
    backend: Arc<dyn StoreBackend>,
    database: String,
    collection: String,
    predicate: Predicate,
    max_item_count: Option<u32>,
    buffer: VecDeque<Document>,
    continuation: Option<String>,
    exhausted: bool,
    in_flight: Option<BoxFuture<'static, Result<QueryPage>>>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Cursor<T> {
    pub(crate) fn new(
        backend: Arc<dyn StoreBackend>,
        database: String,
        collection: String,
        predicate: Predicate,
        max_item_count: Option<u32>,
    ) -> Self {
        Self {
            backend,
            database,
            collection,
            predicate,
            max_item_count,
            buffer: VecDeque::new(),
            continuation: None,
            exhausted: false,
            in_flight: None,
            _phantom: PhantomData,
        }
    }

    fn start_fetch(&mut self) {
        let backend = self.backend.clone();
        let database = self.database.clone();
        let collection = self.collection.clone();
        let predicate = self.predicate.clone();
        let page = PageRequest::new(self.max_item_count, self.continuation.take());
        self.in_flight = Some(Box::pin(async move {
            backend
                .query_documents(&database, &collection, &predicate, page)
                .await
        }));
    }
}

impl<T> Stream for Cursor<T>
where
    T: DeserializeOwned,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(document) = this.buffer.pop_front() {
                let item = serde_json::from_value(Value::Object(document)).map_err(Into::into);
                return Poll::Ready(Some(item));
            }
            if this.exhausted {
                return Poll::Ready(None);
            }

            if this.in_flight.is_none() {
                this.start_fetch();
            }
            let fut = this.in_flight.as_mut().expect("fetch future just installed");
            match fut.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(result) => {
                    this.in_flight = None;
                    match result {
                        Ok(page) => {
                            this.buffer = page.documents.into_iter().collect();
                            this.continuation = page.continuation;
                            this.exhausted = this.continuation.is_none();
                        }
                        Err(error) => {
                            this.exhausted = true;
                            return Poll::Ready(Some(Err(error)));
                        }
                    }
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("predicate", &self.predicate)
            .field("max_item_count", &self.max_item_count)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
