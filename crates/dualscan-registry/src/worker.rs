//! Executes engine commands against a [`Registry`].
//!
//! Each command runs in its own task, so completions come back in whatever
//! order the registry answers. The engine sorts out which ones still matter.

use std::sync::Arc;

use dualscan_core::{
    Chain, ChainPage, Command, DetailRecord, DetailTicket, FetchFailure, ItemKind, Outcome,
    PageRequest, PerChain, Trigger,
};
use futures::future::join_all;
use tokio::sync::mpsc;

use crate::client::Registry;

/// Receive commands until the channel closes, forwarding every outcome.
pub async fn registry_task<M>(
    registry: Arc<dyn Registry>,
    mut command_rx: mpsc::Receiver<Command>,
    outcome_tx: mpsc::Sender<M>,
) where
    M: From<Outcome> + Send + 'static,
{
    while let Some(command) = command_rx.recv().await {
        let registry = registry.clone();
        let outcome_tx = outcome_tx.clone();
        tokio::spawn(async move {
            for outcome in execute(registry.as_ref(), command).await {
                if outcome_tx.send(M::from(outcome)).await.is_err() {
                    tracing::debug!("Outcome receiver dropped");
                    break;
                }
            }
        });
    }
    tracing::info!("Registry worker stopped");
}

/// Run one command to completion. Failures are returned as outcomes, never raised.
pub async fn execute(registry: &dyn Registry, command: Command) -> Vec<Outcome> {
    match command {
        Command::FetchStats => {
            join_all(Chain::all().iter().map(|&chain| async move {
                let result = registry.get_stats(chain).await.map_err(FetchFailure::from);
                Outcome::Stats { chain, result }
            }))
            .await
        }
        Command::FetchPage { request, trigger } => {
            join_all(
                Chain::all()
                    .iter()
                    .filter(|&&chain| request.includes(chain))
                    .map(|&chain| fetch_page(registry, chain, request, trigger)),
            )
            .await
        }
        Command::Search { query, epoch } => {
            let result = search_both(registry, &query).await;
            vec![Outcome::Search { epoch, result }]
        }
        Command::FetchDetail(ticket) => {
            let result = fetch_detail(registry, &ticket).await;
            vec![Outcome::Detail { ticket, result }]
        }
    }
}

async fn fetch_page(
    registry: &dyn Registry,
    chain: Chain,
    request: PageRequest,
    trigger: Trigger,
) -> Outcome {
    let (blocks, transactions) = futures::join!(
        registry.get_blocks(chain, request.blocks_window()),
        registry.get_transactions(chain, request.transactions_window()),
    );
    let result = match (blocks, transactions) {
        (Ok(blocks), Ok(transactions)) => Ok(ChainPage {
            blocks,
            transactions,
        }),
        (Err(e), _) | (_, Err(e)) => Err(FetchFailure::from(e)),
    };
    Outcome::Page {
        chain,
        request,
        trigger,
        result,
    }
}

async fn search_both(
    registry: &dyn Registry,
    query: &str,
) -> Result<PerChain<ChainPage>, FetchFailure> {
    let (primary, secondary) = futures::try_join!(
        registry.search(Chain::Primary, query),
        registry.search(Chain::Secondary, query),
    )?;
    Ok(PerChain::new(primary, secondary))
}

async fn fetch_detail(
    registry: &dyn Registry,
    ticket: &DetailTicket,
) -> Result<DetailRecord, FetchFailure> {
    let key = &ticket.key;
    let record = match key.kind {
        ItemKind::Block => registry
            .get_block_detail(key.chain, &key.identifier)
            .await
            .map(DetailRecord::Block),
        ItemKind::Transaction => registry
            .get_transaction_detail(key.chain, &key.identifier)
            .await
            .map(DetailRecord::Transaction),
    };
    record.map_err(FetchFailure::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use dualscan_core::{
        BlockDetail, BlockSummary, ChainStats, DetailState, Explorer, FailureKind, PageSizes,
        SelectionKey, TransactionDetail, TransactionSummary, Window,
    };
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory registry with per-identifier latency.
    #[derive(Default)]
    struct MockRegistry {
        delays: BTreeMap<String, Duration>,
        failing_chain: Option<Chain>,
        calls: Mutex<Vec<String>>,
    }

    impl MockRegistry {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        async fn latency(&self, id: &str) {
            if let Some(delay) = self.delays.get(id) {
                tokio::time::sleep(*delay).await;
            }
        }

        fn check(&self, chain: Chain) -> Result<(), RegistryError> {
            if self.failing_chain == Some(chain) {
                Err(RegistryError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    fn block(chain: Chain, hash: &str) -> BlockSummary {
        BlockSummary {
            chain,
            height: 1,
            hash: hash.to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
            tx_count: Some(0),
        }
    }

    fn tx(chain: Chain, hash: &str) -> TransactionSummary {
        TransactionSummary {
            chain,
            hash: hash.to_string(),
            value: "1".to_string(),
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
            from: None,
            to: None,
            height: Some(1),
        }
    }

    #[async_trait]
    impl Registry for MockRegistry {
        async fn get_stats(&self, chain: Chain) -> Result<ChainStats, RegistryError> {
            self.record(format!("stats:{}", chain));
            self.check(chain)?;
            Ok(ChainStats {
                total_blocks: 100,
                total_transactions: 1_000,
                latest_block: None,
                synced: None,
            })
        }

        async fn get_blocks(
            &self,
            chain: Chain,
            window: Window,
        ) -> Result<Vec<BlockSummary>, RegistryError> {
            self.record(format!("blocks:{}:{}:{}", chain, window.limit, window.offset));
            self.check(chain)?;
            Ok(vec![block(chain, &format!("{}-head", chain))])
        }

        async fn get_transactions(
            &self,
            chain: Chain,
            window: Window,
        ) -> Result<Vec<TransactionSummary>, RegistryError> {
            self.record(format!("txs:{}:{}:{}", chain, window.limit, window.offset));
            self.check(chain)?;
            Ok(vec![tx(chain, &format!("{}-tx", chain))])
        }

        async fn get_block_detail(
            &self,
            chain: Chain,
            hash: &str,
        ) -> Result<BlockDetail, RegistryError> {
            self.latency(hash).await;
            self.check(chain)?;
            Ok(BlockDetail {
                summary: block(chain, hash),
                transactions: Vec::new(),
            })
        }

        async fn get_transaction_detail(
            &self,
            chain: Chain,
            hash: &str,
        ) -> Result<TransactionDetail, RegistryError> {
            self.latency(hash).await;
            self.check(chain)?;
            if hash == "missing" {
                return Err(RegistryError::NotFound(format!("/tx/{}", hash)));
            }
            Ok(TransactionDetail {
                summary: tx(chain, hash),
                fields: BTreeMap::new(),
            })
        }

        async fn search(&self, chain: Chain, query: &str) -> Result<ChainPage, RegistryError> {
            self.record(format!("search:{}:{}", chain, query));
            self.check(chain)?;
            Ok(ChainPage {
                blocks: vec![block(chain, query)],
                transactions: Vec::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_stats_covers_both_chains() {
        let registry = MockRegistry::default();
        let outcomes = execute(&registry, Command::FetchStats).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| matches!(o, Outcome::Stats { result: Ok(_), .. })));
    }

    #[tokio::test]
    async fn test_fetch_page_skips_excluded_chain() {
        let registry = MockRegistry::default();
        let mut explorer = Explorer::new(PageSizes::default(), false);
        let command = explorer
            .select_chain_view(Chain::Secondary, dualscan_core::ViewMode::Blocks)
            .remove(0);

        let outcomes = execute(&registry, command).await;
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            Outcome::Page { chain: Chain::Secondary, result: Ok(_), .. }
        ));

        let calls = registry.calls.lock().unwrap().clone();
        assert!(calls.contains(&"blocks:secondary:15:0".to_string()));
        assert!(calls.iter().all(|c| !c.contains("primary")));
    }

    #[tokio::test]
    async fn test_page_failure_is_per_chain() {
        let registry = MockRegistry {
            failing_chain: Some(Chain::Primary),
            ..MockRegistry::default()
        };
        let explorer = Explorer::new(PageSizes::default(), false);
        let command = explorer.tick().pop().unwrap();

        let outcomes = execute(&registry, command).await;
        for outcome in outcomes {
            match outcome {
                Outcome::Page {
                    chain: Chain::Primary,
                    result,
                    ..
                } => assert_eq!(result.unwrap_err().kind, FailureKind::Transport),
                Outcome::Page {
                    chain: Chain::Secondary,
                    result,
                    ..
                } => assert!(result.is_ok()),
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_search_fails_when_either_chain_fails() {
        let registry = MockRegistry {
            failing_chain: Some(Chain::Secondary),
            ..MockRegistry::default()
        };
        let outcomes = execute(
            &registry,
            Command::Search {
                query: "abc123".to_string(),
                epoch: 3,
            },
        )
        .await;
        assert!(matches!(
            &outcomes[..],
            [Outcome::Search { epoch: 3, result: Err(_) }]
        ));
    }

    #[tokio::test]
    async fn test_detail_not_found_maps_kind() {
        let registry = MockRegistry::default();
        let mut explorer = Explorer::new(PageSizes::default(), false);
        let command = explorer
            .select_item(SelectionKey::transaction(Chain::Primary, "missing"))
            .remove(0);

        for outcome in execute(&registry, command).await {
            explorer.apply(outcome);
        }
        assert!(matches!(
            explorer.detail(),
            DetailState::Errored {
                reason: dualscan_core::DetailFailureReason::NotFound,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_detail_completion() {
        let mut delays = BTreeMap::new();
        delays.insert("slow".to_string(), Duration::from_secs(5));
        delays.insert("fast".to_string(), Duration::from_secs(1));
        let registry: Arc<dyn Registry> = Arc::new(MockRegistry {
            delays,
            ..MockRegistry::default()
        });

        let (command_tx, command_rx) = mpsc::channel::<Command>(8);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome>(8);
        let worker = tokio::spawn(registry_task(registry, command_rx, outcome_tx));

        let mut explorer = Explorer::new(PageSizes::default(), false);
        for command in explorer.select_item(SelectionKey::transaction(Chain::Primary, "slow")) {
            command_tx.send(command).await.unwrap();
        }
        let fast_key = SelectionKey::transaction(Chain::Secondary, "fast");
        for command in explorer.select_item(fast_key.clone()) {
            command_tx.send(command).await.unwrap();
        }

        let first = outcome_rx.recv().await.unwrap();
        assert!(matches!(&first, Outcome::Detail { ticket, .. } if ticket.key == fast_key));
        explorer.apply(first);

        let second = outcome_rx.recv().await.unwrap();
        explorer.apply(second);

        assert!(matches!(explorer.detail(), DetailState::Loaded(key, _) if *key == fast_key));

        drop(command_tx);
        worker.await.unwrap();
    }
}
