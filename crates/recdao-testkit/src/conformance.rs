//! Generic conformance battery.
//!
//! Every check runs against a fresh, empty store produced by the caller's
//! factory. Any [`Store`](recdao_store::Store) implementation or decorator should pass all of
//! them:
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn memory_store_conforms() {
//!     recdao_testkit::conformance::run_all(|| Arc::new(MemoryStore::new()) as StoreRef)
//!         .await
//!         .unwrap();
//! }
//! ```

use std::collections::HashSet;

use anyhow::{bail, ensure, Context, Result};

use recdao_core::{Comparator, Predicate, Record, RecordId};
use recdao_store::{ArraySink, Sink, StoreError, StoreExt, StoreRef, Topic};

use crate::fixtures::{angus, field_str, full_band, jon, names, seed, Recorder};

macro_rules! run_checks {
    ($make:expr, $($check:ident),+ $(,)?) => {
        $(
            $check($make())
                .await
                .with_context(|| format!("conformance check `{}` failed", stringify!($check)))?;
        )+
    };
}

/// Run every check, each against a fresh store from `make`.
pub async fn run_all<F>(make: F) -> Result<()>
where
    F: Fn() -> StoreRef,
{
    run_checks!(
        make,
        put_inserts,
        put_upserts,
        put_assigns_missing_id,
        put_notifies,
        put_into_sink,
        find_existing,
        find_missing,
        remove_returns_record,
        remove_deletes,
        remove_notifies,
        select_empty,
        select_default_sink,
        select_every_record,
        select_sink_error_propagates,
        filter,
        limit,
        skip,
        order_by,
        unsubscribe,
    );
    Ok(())
}

/// Counts puts and eofs, rejecting anything after eof.
#[derive(Debug, Default)]
pub struct TallySink {
    pub puts: usize,
    pub eofs: usize,
    pub ids: Vec<RecordId>,
}

impl Sink for TallySink {
    fn put(&mut self, record: &Record) -> recdao_store::Result<()> {
        if self.eofs > 0 {
            return Err(StoreError::Sink("put after eof".into()));
        }
        self.puts += 1;
        self.ids.extend(record.id());
        Ok(())
    }

    fn eof(&mut self) -> recdao_store::Result<()> {
        self.eofs += 1;
        Ok(())
    }
}

/// Records deliveries and fails on one chosen id.
#[derive(Debug)]
pub struct FailingSink {
    pub fail_on: RecordId,
    pub seen: Vec<RecordId>,
    pub eofs: usize,
}

impl FailingSink {
    pub fn new(fail_on: RecordId) -> Self {
        Self {
            fail_on,
            seen: Vec::new(),
            eofs: 0,
        }
    }
}

impl Sink for FailingSink {
    fn put(&mut self, record: &Record) -> recdao_store::Result<()> {
        let id = record.id();
        self.seen.extend(id.clone());
        if id.as_ref() == Some(&self.fail_on) {
            return Err(StoreError::Sink(format!("refused {}", self.fail_on)));
        }
        Ok(())
    }

    fn eof(&mut self) -> recdao_store::Result<()> {
        self.eofs += 1;
        Ok(())
    }
}

pub async fn put_inserts(store: StoreRef) -> Result<()> {
    let stored = store.put(angus()).await?;
    ensure!(stored.id() == angus().id(), "put returned {:?}", stored);
    Ok(())
}

pub async fn put_upserts(store: StoreRef) -> Result<()> {
    let original = angus();
    store.put(original.clone()).await?;

    let mut changed = original.clone();
    changed.set("firstName", "Neil");
    ensure!(field_str(&original, "firstName") == "Angus", "caller's record was mutated");

    let stored = store.put(changed).await?;
    ensure!(field_str(&stored, "firstName") == "Neil", "put returned {:?}", stored);

    let found = store.find(&RecordId::Int(1)).await?;
    ensure!(found.id() == Some(RecordId::Int(1)), "find returned {:?}", found);
    ensure!(field_str(&found, "firstName") == "Neil", "find returned {:?}", found);

    let count = store.count().await?;
    ensure!(count == 1, "expected 1 record after upsert, counted {}", count);
    Ok(())
}

pub async fn put_assigns_missing_id(store: StoreRef) -> Result<()> {
    store.put(jon()).await?;
    let stored = store.put(Record::new().with("firstName", "Bon")).await?;

    let id = match stored.id() {
        Some(id) => id,
        None => bail!("put did not assign an id: {:?}", stored),
    };
    ensure!(id != RecordId::Int(2), "assigned id collides with an existing record");

    let found = store.find(&id).await?;
    ensure!(field_str(&found, "firstName") == "Bon", "find returned {:?}", found);
    Ok(())
}

pub async fn put_notifies(store: StoreRef) -> Result<()> {
    let recorder = Recorder::new();
    let subscription = store.subscribe(Some(Topic::Put), recorder.listener());

    store.put(angus()).await?;

    // Observable as soon as put returns
    let seen = recorder.notifications();
    ensure!(seen.len() == 1, "expected 1 put notification, saw {}", seen.len());
    let n = &seen[0];
    ensure!(n.subscription == subscription, "wrong subscription handle");
    ensure!(n.channel == "on", "channel was {}", n.channel);
    ensure!(n.topic.as_str() == "put", "topic was {}", n.topic);
    ensure!(n.record.id() == angus().id(), "notified with {:?}", n.record);
    Ok(())
}

pub async fn put_into_sink(store: StoreRef) -> Result<()> {
    let sink = store.put_into(jon(), ArraySink::new()).await?;
    ensure!(sink.records() == [jon()], "sink received {:?}", sink.records());
    ensure!(!sink.is_eof(), "put_into delivered eof");

    let sink = store
        .put_into(Record::new().with("firstName", "Bon"), sink)
        .await?;
    ensure!(sink.len() == 2, "sink received {} records", sink.len());
    let assigned = sink.records()[1].id().context("sink received a record without an id")?;
    let found = store.find(&assigned).await?;
    ensure!(found == sink.records()[1], "sink and store disagree: {:?}", found);
    Ok(())
}

pub async fn find_existing(store: StoreRef) -> Result<()> {
    store.put(angus()).await?;
    let found = store.find(&RecordId::Int(1)).await?;
    ensure!(found == angus(), "find returned {:?}", found);
    Ok(())
}

pub async fn find_missing(store: StoreRef) -> Result<()> {
    expect_not_found(store.find(&RecordId::Int(1)).await, "find before put")?;
    store.put(angus()).await?;
    store.find(&RecordId::Int(1)).await?;
    expect_not_found(store.find(&RecordId::Int(74)).await, "find of 74")?;
    Ok(())
}

pub async fn remove_returns_record(store: StoreRef) -> Result<()> {
    store.put(angus()).await?;
    store.find(&RecordId::Int(1)).await?;

    let removed = store.remove_record(&angus()).await?;
    ensure!(removed.id() == angus().id(), "remove returned {:?}", removed);
    ensure!(field_str(&removed, "firstName") == "Angus", "remove returned {:?}", removed);
    Ok(())
}

pub async fn remove_deletes(store: StoreRef) -> Result<()> {
    store.put(angus()).await?;

    let removed = store.remove(&RecordId::Int(1)).await?;
    let id = removed.id().context("removed record has no id")?;
    expect_not_found(store.find(&id).await, "find after remove")?;
    expect_not_found(store.remove(&id).await, "second remove")?;
    Ok(())
}

pub async fn remove_notifies(store: StoreRef) -> Result<()> {
    let recorder = Recorder::new();
    store.subscribe(Some(Topic::Remove), recorder.listener());

    store.put(angus()).await?;
    ensure!(recorder.is_empty(), "remove listener saw a put");

    store.remove_record(&angus()).await?;
    let seen = recorder.notifications();
    ensure!(seen.len() == 1, "expected 1 remove notification, saw {}", seen.len());
    ensure!(seen[0].channel == "on", "channel was {}", seen[0].channel);
    ensure!(seen[0].topic == Topic::Remove, "topic was {}", seen[0].topic);
    ensure!(seen[0].record.id() == angus().id(), "notified with {:?}", seen[0].record);
    Ok(())
}

pub async fn select_empty(store: StoreRef) -> Result<()> {
    let tally = store.select_into(TallySink::default()).await?;
    ensure!(tally.puts == 0, "empty store delivered {} records", tally.puts);
    ensure!(tally.eofs == 1, "eof called {} times", tally.eofs);
    Ok(())
}

pub async fn select_default_sink(store: StoreRef) -> Result<()> {
    let sink = store.select_all().await?;
    ensure!(sink.is_eof(), "default sink did not receive eof");
    ensure!(sink.is_empty(), "default sink has {} records", sink.len());
    Ok(())
}

pub async fn select_every_record(store: StoreRef) -> Result<()> {
    seed(&store, [angus(), jon()]).await?;

    let tally = store.select_into(TallySink::default()).await?;
    ensure!(tally.puts == 2, "delivered {} records", tally.puts);
    ensure!(tally.eofs == 1, "eof called {} times", tally.eofs);

    let unique: HashSet<&RecordId> = tally.ids.iter().collect();
    ensure!(unique.len() == 2, "duplicate delivery: {:?}", tally.ids);
    Ok(())
}

pub async fn select_sink_error_propagates(store: StoreRef) -> Result<()> {
    seed(&store, full_band()).await?;

    // Natural order: the failing record is the last one delivered
    let mut sink = FailingSink::new(RecordId::Int(3));
    expect_sink_error(store.select(&mut sink).await, "select")?;
    ensure!(sink.seen.last() == Some(&RecordId::Int(3)), "delivered {:?}", sink.seen);
    ensure!(sink.eofs == 0, "eof called after a sink error");

    let mut sink = FailingSink::new(RecordId::Int(3));
    let dead = store.filter(Predicate::eq("deceased", true));
    expect_sink_error(dead.select(&mut sink).await, "filtered select")?;
    ensure!(sink.seen.last() == Some(&RecordId::Int(3)), "delivered {:?}", sink.seen);
    ensure!(!sink.seen.contains(&RecordId::Int(1)), "filter leaked {:?}", sink.seen);
    ensure!(sink.eofs == 0, "eof called after a sink error");

    // Records before the failure stay delivered
    let mut sink = FailingSink::new(RecordId::Int(3));
    let descending = store.order_by(Comparator::desc("id"));
    expect_sink_error(descending.select(&mut sink).await, "ordered select")?;
    ensure!(
        sink.seen == [RecordId::Int(4), RecordId::Int(3)],
        "ordered select delivered {:?}",
        sink.seen
    );
    ensure!(sink.eofs == 0, "eof called after a sink error");
    Ok(())
}

pub async fn filter(store: StoreRef) -> Result<()> {
    seed(&store, [angus(), jon()]).await?;

    let dead = store
        .filter(Predicate::neq("deceased", false))
        .select_all()
        .await?;
    ensure!(dead.len() == 1, "filter delivered {} records", dead.len());
    ensure!(dead.records()[0].id() == jon().id(), "filter delivered {:?}", dead.records());
    Ok(())
}

pub async fn limit(store: StoreRef) -> Result<()> {
    seed(&store, [angus(), jon()]).await?;

    let first = store.limit(1).select_all().await?;
    ensure!(first.len() == 1, "limit(1) delivered {} records", first.len());
    ensure!(first.is_eof(), "limit(1) did not deliver eof");
    Ok(())
}

pub async fn skip(store: StoreRef) -> Result<()> {
    seed(&store, [angus(), jon()]).await?;

    let first = store.limit(1).select_all().await?;
    let second = store.skip(1).limit(1).select_all().await?;
    ensure!(first.len() == 1, "limit(1) delivered {} records", first.len());
    ensure!(second.len() == 1, "skip(1).limit(1) delivered {} records", second.len());
    ensure!(
        first.records()[0].id() != second.records()[0].id(),
        "skip(1) repeated the first record"
    );
    Ok(())
}

pub async fn order_by(store: StoreRef) -> Result<()> {
    seed(&store, [angus(), jon()]).await?;

    let by_last = store.order_by(Comparator::asc("lastName")).select_all().await?;
    let last_names = names(by_last.records(), "lastName");
    ensure!(last_names == ["Bonham", "Young"], "ordered by last name: {:?}", last_names);

    let by_first = store.order_by(Comparator::asc("firstName")).select_all().await?;
    let first_names = names(by_first.records(), "firstName");
    ensure!(first_names == ["Angus", "Jon"], "ordered by first name: {:?}", first_names);
    Ok(())
}

pub async fn unsubscribe(store: StoreRef) -> Result<()> {
    let recorder = Recorder::new();
    let subscription = store.subscribe(None, recorder.listener());

    store.put(angus()).await?;
    ensure!(store.unsubscribe(subscription), "unsubscribe returned false");
    ensure!(!store.unsubscribe(subscription), "second unsubscribe returned true");

    store.put(jon()).await?;
    store.remove(&RecordId::Int(1)).await?;
    ensure!(recorder.len() == 1, "saw {} notifications", recorder.len());
    Ok(())
}

fn expect_sink_error(result: recdao_store::Result<()>, what: &str) -> Result<()> {
    match result {
        Err(StoreError::Sink(_)) => Ok(()),
        Err(e) => bail!("{}: expected a sink error, got {}", what, e),
        Ok(()) => bail!("{}: sink error was swallowed", what),
    }
}

fn expect_not_found<T: std::fmt::Debug>(
    result: recdao_store::Result<T>,
    what: &str,
) -> Result<()> {
    match result {
        Err(StoreError::NotFound(_)) => Ok(()),
        Err(e) => bail!("{}: expected NotFound, got {}", what, e),
        Ok(v) => bail!("{}: expected NotFound, got {:?}", what, v),
    }
}
