// ==========================================
// OSV 液舱管理系统 - 调驳计划仓储
// ==========================================
// 存储: osv_transfer_steps/{vessel_id} -> [{"tanks": [...], "note": "..."}]
// 红线: 每次变更整表重写, 不做增量
// 红线: 数据缺失或损坏时回退为空计划, 不报错
// ==========================================

use crate::domain::transfer::TransferStep;
use crate::repository::error::RepositoryResult;
use crate::repository::kv_store::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// 调驳计划存储键前缀
pub const TRANSFER_STEPS_KEY_PREFIX: &str = "osv_transfer_steps";

// ==========================================
// TransferPlanRepository - 调驳计划仓储
// ==========================================
pub struct TransferPlanRepository {
    store: Arc<dyn KeyValueStore>,
}

impl TransferPlanRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 船舶计划的存储键
    pub fn plan_key(vessel_id: u32) -> String {
        format!("{}/{}", TRANSFER_STEPS_KEY_PREFIX, vessel_id)
    }

    /// 读取船舶计划
    ///
    /// # 返回
    /// - `Ok(steps)`: 已保存的步骤 (无记录或记录损坏时为空)
    /// - `Err(...)`: 存储读取失败
    pub fn load(&self, vessel_id: u32) -> RepositoryResult<Vec<TransferStep>> {
        let key = Self::plan_key(vessel_id);
        let raw = match self.store.get(&key)? {
            Some(raw) => raw,
            None => {
                debug!(vessel_id, "无已保存的调驳计划");
                return Ok(Vec::new());
            }
        };

        match serde_json::from_str::<Vec<TransferStep>>(&raw) {
            Ok(steps) => Ok(steps),
            Err(e) => {
                warn!(vessel_id, error = %e, "调驳计划数据损坏, 回退为空计划");
                Ok(Vec::new())
            }
        }
    }

    /// 整表保存船舶计划
    pub fn save(&self, vessel_id: u32, steps: &[TransferStep]) -> RepositoryResult<()> {
        let json = serde_json::to_string(steps)?;
        self.store.put(&Self::plan_key(vessel_id), &json)?;
        debug!(vessel_id, step_count = steps.len(), "调驳计划已保存");
        Ok(())
    }

    /// 删除船舶计划
    pub fn clear(&self, vessel_id: u32) -> RepositoryResult<()> {
        self.store.remove(&Self::plan_key(vessel_id))
    }

    /// 列出有已保存计划的船舶
    pub fn list_vessel_ids(&self) -> RepositoryResult<Vec<u32>> {
        let prefix = format!("{}/", TRANSFER_STEPS_KEY_PREFIX);
        let mut ids: Vec<u32> = self
            .store
            .keys_with_prefix(&prefix)?
            .iter()
            .filter_map(|k| k[prefix.len()..].parse::<u32>().ok())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::kv_store::InMemoryKeyValueStore;

    fn repo() -> (Arc<InMemoryKeyValueStore>, TransferPlanRepository) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        (store.clone(), TransferPlanRepository::new(store))
    }

    #[test]
    fn test_load_missing_returns_empty() {
        let (_store, repo) = repo();
        assert!(repo.load(1).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_preserves_order() {
        let (_store, repo) = repo();
        let steps = vec![
            TransferStep::new(vec!["Tk 1S".to_string()], "Load brine"),
            TransferStep::new(vec!["Tk 2S".to_string(), "Tk 2P".to_string()], "Balance"),
        ];
        repo.save(1, &steps).unwrap();
        assert_eq!(repo.load(1).unwrap(), steps);
        assert!(repo.load(2).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_data_falls_back_to_empty() {
        let (store, repo) = repo();
        store.put(&TransferPlanRepository::plan_key(1), "{not json").unwrap();
        assert!(repo.load(1).unwrap().is_empty());
    }

    #[test]
    fn test_persisted_layout() {
        let (store, repo) = repo();
        repo.save(7, &[TransferStep::new(vec!["Meth 1P".to_string()], "Top up")])
            .unwrap();
        let raw = store.get("osv_transfer_steps/7").unwrap().unwrap();
        assert_eq!(raw, r#"[{"tanks":["Meth 1P"],"note":"Top up"}]"#);
        assert_eq!(repo.list_vessel_ids().unwrap(), vec![7]);
    }
}
