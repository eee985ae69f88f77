use crate::{error::CoreError, InnerResult};

use core_ckb_client::CkbRpc;

use ckb_types::core::{BlockNumber, HeaderView};

use std::collections::HashMap;
use std::sync::Arc;

/// Block headers by number, cached for the lifetime of one builder.
pub struct HeaderResolver<C> {
    client: Arc<C>,
    headers: HashMap<BlockNumber, HeaderView>,
}

impl<C: CkbRpc> HeaderResolver<C> {
    pub fn new(client: Arc<C>) -> Self {
        HeaderResolver {
            client,
            headers: HashMap::new(),
        }
    }

    pub fn with_headers<I: IntoIterator<Item = HeaderView>>(client: Arc<C>, known: I) -> Self {
        let mut resolver = HeaderResolver::new(client);
        known.into_iter().for_each(|header| resolver.insert(header));
        resolver
    }

    pub fn insert(&mut self, header: HeaderView) {
        self.headers.insert(header.number(), header);
    }

    pub fn cached(&self, block_number: BlockNumber) -> Option<&HeaderView> {
        self.headers.get(&block_number)
    }

    pub async fn get_header(&mut self, block_number: BlockNumber) -> InnerResult<HeaderView> {
        if let Some(header) = self.headers.get(&block_number) {
            return Ok(header.clone());
        }

        let header: HeaderView = self
            .client
            .get_header_by_number(block_number)
            .await
            .map_err(CoreError::client)?
            .ok_or(CoreError::HeaderNotFound(block_number))?
            .into();
        log::debug!("[header] fetched block {} {:#x}", block_number, header.hash());

        self.headers.insert(block_number, header.clone());
        Ok(header)
    }
}
