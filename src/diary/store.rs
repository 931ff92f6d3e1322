use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::utils::time::date_key;

use super::entities::{DayRecord, ExerciseEntry, FoodEntry, MealSlot, WaterStatus, WaterUpdate};

/// Cups of water a single day can hold, regardless of the configured goal.
pub const WATER_HARD_CAP: u32 = 99;

/// Interface for abstracting the per-day diary namespace.
///
/// Read-modify-write operations are not atomic across concurrent callers;
/// last write wins. Acceptable for the single-user foreground access pattern
/// this store serves.
pub trait DiaryStore {
    /// Loads the record for a day. A missing or malformed blob yields the
    /// canonical empty record, a corrupt local day must never block viewing it.
    fn load(&self, date: NaiveDate) -> impl Future<Output = Result<DayRecord>> + Send;

    /// Serializes and overwrites the whole record for a day. There is no
    /// partial-field patch. A failed write surfaces to the caller; in-memory
    /// state is not rolled back.
    fn save(&self, date: NaiveDate, record: &DayRecord) -> impl Future<Output = Result<()>> + Send;

    /// Appends a food entry to the named meal slot and persists the day.
    fn append_food(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        entry: FoodEntry,
    ) -> impl Future<Output = Result<DayRecord>> + Send;

    /// Appends a workout to the day's exercise log and persists it.
    fn append_exercise(
        &self,
        date: NaiveDate,
        entry: ExerciseEntry,
    ) -> impl Future<Output = Result<DayRecord>> + Send;

    /// Applies a cup delta to the day's water count against the configured
    /// goal. Persists on [WaterStatus::Ok] and [WaterStatus::LimitReached],
    /// no-ops on [WaterStatus::GoalReached].
    fn set_water(
        &self,
        date: NaiveDate,
        delta: i32,
        goal: u32,
    ) -> impl Future<Output = Result<WaterUpdate>> + Send;
}

impl<T: Deref + Sync> DiaryStore for T
where
    T::Target: DiaryStore + Sync,
{
    fn load(&self, date: NaiveDate) -> impl Future<Output = Result<DayRecord>> + Send {
        self.deref().load(date)
    }

    fn save(&self, date: NaiveDate, record: &DayRecord) -> impl Future<Output = Result<()>> + Send {
        self.deref().save(date, record)
    }

    fn append_food(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        entry: FoodEntry,
    ) -> impl Future<Output = Result<DayRecord>> + Send {
        self.deref().append_food(date, slot, entry)
    }

    fn append_exercise(
        &self,
        date: NaiveDate,
        entry: ExerciseEntry,
    ) -> impl Future<Output = Result<DayRecord>> + Send {
        self.deref().append_exercise(date, entry)
    }

    fn set_water(
        &self,
        date: NaiveDate,
        delta: i32,
        goal: u32,
    ) -> impl Future<Output = Result<WaterUpdate>> + Send {
        self.deref().set_water(date, delta, goal)
    }
}

/// The main realization of [DiaryStore]. Keeps one JSON file per namespace key
/// (day records under `YYYY-MM-DD`, settings under their own keys) inside a
/// single data directory.
pub struct DiaryStoreImpl {
    data_dir: PathBuf,
}

impl DiaryStoreImpl {
    pub fn new(data_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    /// Reads and parses the blob under `key`. Missing file and malformed
    /// payload both fall back to `T::default()`; only genuine I/O failures
    /// propagate.
    pub(crate) async fn read_key<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let path = self.key_path(key);
        let contents = match Self::read_locked(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<T>(&contents) {
            Ok(v) => Ok(v),
            Err(e) => {
                // Availability over consistency: a corrupt blob is logged and
                // replaced by the empty state instead of failing the caller.
                warn!("Malformed payload under key {key} in {path:?}: {e}");
                Ok(T::default())
            }
        }
    }

    /// Serializes `value` and overwrites the blob under `key`.
    pub(crate) async fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        debug!("Writing key {key} to {path:?}");

        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::overwrite(&mut file, value).await;
        file.unlock_async().await?;
        result
    }

    async fn read_locked(path: &Path) -> std::result::Result<String, std::io::Error> {
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut contents = String::new();
        let result = file.read_to_string(&mut contents).await;
        file.unlock_async().await?;
        result?;
        Ok(contents)
    }

    async fn overwrite<T: Serialize + ?Sized>(file: &mut File, value: &T) -> Result<()> {
        let buffer = serde_json::to_vec(value)?;
        file.set_len(0).await?;
        file.seek(std::io::SeekFrom::Start(0)).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

impl DiaryStore for DiaryStoreImpl {
    async fn load(&self, date: NaiveDate) -> Result<DayRecord> {
        self.read_key(&date_key(date)).await
    }

    async fn save(&self, date: NaiveDate, record: &DayRecord) -> Result<()> {
        self.write_key(&date_key(date), record).await
    }

    async fn append_food(
        &self,
        date: NaiveDate,
        slot: MealSlot,
        entry: FoodEntry,
    ) -> Result<DayRecord> {
        entry.validate()?;
        let mut record = self.load(date).await?;
        record.meal_mut(slot).push(entry);
        self.save(date, &record).await?;
        Ok(record)
    }

    async fn append_exercise(&self, date: NaiveDate, entry: ExerciseEntry) -> Result<DayRecord> {
        let mut record = self.load(date).await?;
        record.exercises.push(entry);
        self.save(date, &record).await?;
        Ok(record)
    }

    async fn set_water(&self, date: NaiveDate, delta: i32, goal: u32) -> Result<WaterUpdate> {
        let mut record = self.load(date).await?;
        let update = apply_water_delta(record.water, delta, goal, WATER_HARD_CAP);
        if update.status == WaterStatus::GoalReached {
            return Ok(update);
        }
        record.water = update.count;
        self.save(date, &record).await?;
        Ok(update)
    }
}

/// Water-count transition logic, kept pure so the goal/cap interplay is
/// testable without touching the filesystem.
pub fn apply_water_delta(current: u32, delta: i32, goal: u32, hard_cap: u32) -> WaterUpdate {
    if delta > 0 && current >= goal {
        return WaterUpdate {
            count: current,
            status: WaterStatus::GoalReached,
        };
    }

    let raw = current as i64 + delta as i64;
    if raw > hard_cap as i64 {
        WaterUpdate {
            count: hard_cap,
            status: WaterStatus::LimitReached,
        }
    } else {
        WaterUpdate {
            count: raw.max(0) as u32,
            status: WaterStatus::Ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    use crate::diary::entities::{DayRecord, ExerciseEntry, FoodEntry, MealSlot, WaterStatus};
    use crate::utils::logging::TEST_LOGGING;

    use super::{apply_water_delta, DiaryStore, DiaryStoreImpl, WATER_HARD_CAP};

    const TEST_DATE: &str = "2024-01-01";

    fn test_date() -> NaiveDate {
        TEST_DATE.parse().unwrap()
    }

    fn entry(name: &str, calories: f64) -> FoodEntry {
        FoodEntry {
            name: name.into(),
            calories,
            p: 1.0,
            c: 2.0,
            f: 3.0,
            fib: 0.0,
            sug: 0.0,
            sod: 0.0,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn unwritten_date_loads_as_empty_record() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let record = store.load(test_date()).await?;
        assert_eq!(record, DayRecord::default());
        Ok(())
    }

    #[tokio::test]
    async fn save_then_load_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let mut record = DayRecord::default();
        record.breakfast.push(entry("eggs", 155.0));
        record.water = 3;
        record.exercises.push(ExerciseEntry {
            name: "walk".into(),
            calories: 90.0,
        });

        store.save(test_date(), &record).await?;
        let loaded = store.load(test_date()).await?;
        assert_eq!(loaded, record);
        Ok(())
    }

    #[tokio::test]
    async fn append_food_lands_last_in_named_slot() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        store
            .append_food(test_date(), MealSlot::Lunch, entry("rice", 350.0))
            .await?;
        let returned = store
            .append_food(test_date(), MealSlot::Lunch, entry("chicken", 240.0))
            .await?;

        assert_eq!(returned.lunch.len(), 2);

        let loaded = store.load(test_date()).await?;
        assert_eq!(loaded.lunch.last().unwrap().name.as_ref(), "chicken");
        assert!(loaded.breakfast.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn append_food_rejects_invalid_entry_without_persisting() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let mut bad = entry("bad", 100.0);
        bad.sod = -5.0;
        assert!(store
            .append_food(test_date(), MealSlot::Snacks, bad)
            .await
            .is_err());

        let loaded = store.load(test_date()).await?;
        assert_eq!(loaded, DayRecord::default());
        Ok(())
    }

    #[tokio::test]
    async fn save_overwrites_longer_previous_blob() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let mut big = DayRecord::default();
        for i in 0..20 {
            big.snacks.push(entry(&format!("snack {i}"), 50.0));
        }
        store.save(test_date(), &big).await?;

        let small = DayRecord {
            water: 1,
            ..DayRecord::default()
        };
        store.save(test_date(), &small).await?;

        // A stale tail from the bigger blob would fail parsing and fall back
        // to the empty record instead of the one just written.
        assert_eq!(store.load(test_date()).await?, small);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_blob_falls_back_to_empty() -> Result<()> {
        let _ = *TEST_LOGGING;
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let mut file = tokio::fs::File::create(dir.path().join(format!("{TEST_DATE}.json"))).await?;
        file.write_all(b"{\"water\": 3, \"lunch\": [tru").await?;
        file.flush().await?;

        let record = store.load(test_date()).await?;
        assert_eq!(record, DayRecord::default());
        Ok(())
    }

    #[tokio::test]
    async fn water_delta_persists_within_goal() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let update = store.set_water(test_date(), 1, 8).await?;
        assert_eq!(update.count, 1);
        assert_eq!(update.status, WaterStatus::Ok);

        assert_eq!(store.load(test_date()).await?.water, 1);
        Ok(())
    }

    #[tokio::test]
    async fn water_goal_reached_leaves_state_untouched() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let record = DayRecord {
            water: 8,
            ..DayRecord::default()
        };
        store.save(test_date(), &record).await?;

        let update = store.set_water(test_date(), 1, 8).await?;
        assert_eq!(update.status, WaterStatus::GoalReached);
        assert_eq!(update.count, 8);
        assert_eq!(store.load(test_date()).await?.water, 8);

        // Decrements still go through after the goal is met.
        let update = store.set_water(test_date(), -1, 8).await?;
        assert_eq!(update.status, WaterStatus::Ok);
        assert_eq!(store.load(test_date()).await?.water, 7);
        Ok(())
    }

    #[tokio::test]
    async fn water_limit_clamp_is_persisted() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        let record = DayRecord {
            water: 97,
            ..DayRecord::default()
        };
        store.save(test_date(), &record).await?;

        let update = store.set_water(test_date(), 5, 120).await?;
        assert_eq!(update.status, WaterStatus::LimitReached);
        assert_eq!(update.count, WATER_HARD_CAP);
        assert_eq!(store.load(test_date()).await?.water, WATER_HARD_CAP);
        Ok(())
    }

    #[test]
    fn water_delta_clamps_at_hard_cap() {
        let update = apply_water_delta(99, 1, 120, WATER_HARD_CAP);
        assert_eq!(update.status, WaterStatus::LimitReached);
        assert_eq!(update.count, 99);

        let update = apply_water_delta(98, 5, 120, WATER_HARD_CAP);
        assert_eq!(update.status, WaterStatus::LimitReached);
        assert_eq!(update.count, 99);
    }

    #[test]
    fn water_delta_floors_at_zero() {
        let update = apply_water_delta(0, -1, 8, WATER_HARD_CAP);
        assert_eq!(update.status, WaterStatus::Ok);
        assert_eq!(update.count, 0);
    }

    #[tokio::test]
    async fn store_works_behind_a_reference() -> Result<()> {
        let dir = tempdir()?;
        let store = DiaryStoreImpl::new(dir.path().to_owned())?;

        async fn load_through(storage: impl DiaryStore, date: NaiveDate) -> Result<DayRecord> {
            storage.load(date).await
        }

        let record = load_through(&store, test_date()).await?;
        assert_eq!(record, DayRecord::default());
        Ok(())
    }
}
