use serde::Serialize;

/// 类别数量（模型输出向量长度）
pub const NUM_CLASSES: usize = 3;

/// 单个类别的静态描述
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassInfo {
    /// 短名称（模型输出顺序的规范标签）
    pub name: &'static str,
    /// 完整病害名称
    pub full_name: &'static str,
    /// UI展示颜色
    pub color: &'static str,
}

/// 固定的类别表，顺序与训练时的标签编码一致，不可调整
pub const CLASSES: [ClassInfo; NUM_CLASSES] = [
    ClassInfo {
        name: "CBSD",
        full_name: "Cassava Brown Streak Disease",
        color: "#ff6b6b",
    },
    ClassInfo {
        name: "CMD",
        full_name: "Cassava Mosaic Disease",
        color: "#ffa500",
    },
    ClassInfo {
        name: "Healthy",
        full_name: "Healthy",
        color: "#51cf66",
    },
];

/// 找到概率最大的类别索引及其置信度
///
/// 并列时取最小索引（标准argmax首次出现语义）。
pub fn top_class(scores: &[f32; NUM_CLASSES]) -> (usize, f32) {
    let mut max_idx = 0;
    let mut max_prob = scores[0];

    for (i, &prob) in scores.iter().enumerate().skip(1) {
        if prob > max_prob {
            max_prob = prob;
            max_idx = i;
        }
    }

    (max_idx, max_prob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_table_order_is_fixed() {
        assert_eq!(CLASSES[0].name, "CBSD");
        assert_eq!(CLASSES[1].name, "CMD");
        assert_eq!(CLASSES[2].name, "Healthy");
    }

    #[test]
    fn test_top_class_picks_maximum() {
        let (idx, conf) = top_class(&[0.1, 0.7, 0.2]);
        assert_eq!(idx, 1);
        assert_eq!(conf, 0.7);
        assert_eq!(CLASSES[idx].name, "CMD");
    }

    #[test]
    fn test_top_class_tie_break_prefers_lowest_index() {
        let (idx, conf) = top_class(&[0.4, 0.4, 0.2]);
        assert_eq!(idx, 0);
        assert_eq!(conf, 0.4);

        let (idx, _) = top_class(&[0.2, 0.4, 0.4]);
        assert_eq!(idx, 1);

        // 三方并列同样取首位
        let third = 1.0 / 3.0;
        let (idx, _) = top_class(&[third, third, third]);
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_confidence_equals_distribution_entry() {
        let scores = [0.05, 0.15, 0.8];
        let (idx, conf) = top_class(&scores);
        assert_eq!(conf, scores[idx]);
    }
}
