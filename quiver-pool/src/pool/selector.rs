use chrono::{DateTime, TimeDelta, Utc};
use quiver_core::EndpointRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// 选择方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// 从冷却完毕的端点中随机选择
    Available,
    /// 所有有效端点都在冷却中，退回最久未使用的端点
    LeastRecentlyUsed,
}

/// 端点选择器
///
/// 冷却完毕的有效端点之间均匀随机；全部在冷却中时选择
/// `last_used_at` 最早的有效端点（从未使用的优先），保证只要存在
/// 有效端点就不会返回空，代价是过载时会违反冷却时间。
///
/// 未指定种子时结果不可复现。
pub struct EndpointSelector {
    rng: StdRng,
}

impl EndpointSelector {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// 选出下一个端点的身份键，不修改任何记录
    pub fn choose(
        &mut self,
        endpoints: &BTreeMap<String, EndpointRecord>,
        now: DateTime<Utc>,
        usage_threshold: TimeDelta,
    ) -> Option<(String, SelectionKind)> {
        if endpoints.is_empty() {
            return None;
        }

        let available: Vec<&String> = endpoints
            .iter()
            .filter(|(_, record)| record.is_available(now, usage_threshold))
            .map(|(identity, _)| identity)
            .collect();

        if !available.is_empty() {
            let index = self.rng.random_range(0..available.len());
            return Some((available[index].clone(), SelectionKind::Available));
        }

        // None 排在任何时间之前
        endpoints
            .iter()
            .filter(|(_, record)| record.valid)
            .min_by_key(|(_, record)| record.last_used_at)
            .map(|(identity, _)| (identity.clone(), SelectionKind::LeastRecentlyUsed))
    }
}
