//! Ordinal tables for the tutor's five-point session ratings.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementLevel {
    HighlyEngaged,
    Engaged,
    Neutral,
    Distracted,
    Unattentive,
}

impl EngagementLevel {
    pub const ALL: [EngagementLevel; 5] = [
        EngagementLevel::HighlyEngaged,
        EngagementLevel::Engaged,
        EngagementLevel::Neutral,
        EngagementLevel::Distracted,
        EngagementLevel::Unattentive,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Highly Engaged" => Some(EngagementLevel::HighlyEngaged),
            "Engaged" => Some(EngagementLevel::Engaged),
            "Neutral" => Some(EngagementLevel::Neutral),
            "Distracted" => Some(EngagementLevel::Distracted),
            "Unattentive" => Some(EngagementLevel::Unattentive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementLevel::HighlyEngaged => "Highly Engaged",
            EngagementLevel::Engaged => "Engaged",
            EngagementLevel::Neutral => "Neutral",
            EngagementLevel::Distracted => "Distracted",
            EngagementLevel::Unattentive => "Unattentive",
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            EngagementLevel::Unattentive => 1,
            EngagementLevel::Distracted => 2,
            EngagementLevel::Neutral => 3,
            EngagementLevel::Engaged => 4,
            EngagementLevel::HighlyEngaged => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnderstandingLevel {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
    Poor,
}

impl UnderstandingLevel {
    pub const ALL: [UnderstandingLevel; 5] = [
        UnderstandingLevel::Excellent,
        UnderstandingLevel::Good,
        UnderstandingLevel::Fair,
        UnderstandingLevel::NeedsImprovement,
        UnderstandingLevel::Poor,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Excellent" => Some(UnderstandingLevel::Excellent),
            "Good" => Some(UnderstandingLevel::Good),
            "Fair" => Some(UnderstandingLevel::Fair),
            "Needs Improvement" => Some(UnderstandingLevel::NeedsImprovement),
            "Poor" => Some(UnderstandingLevel::Poor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnderstandingLevel::Excellent => "Excellent",
            UnderstandingLevel::Good => "Good",
            UnderstandingLevel::Fair => "Fair",
            UnderstandingLevel::NeedsImprovement => "Needs Improvement",
            UnderstandingLevel::Poor => "Poor",
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            UnderstandingLevel::Poor => 1,
            UnderstandingLevel::NeedsImprovement => 2,
            UnderstandingLevel::Fair => 3,
            UnderstandingLevel::Good => 4,
            UnderstandingLevel::Excellent => 5,
        }
    }
}

/// Ordinal score of a stored engagement label; unknown labels score 0.
pub fn engagement_score(value: &str) -> u8 {
    EngagementLevel::parse(value).map_or(0, |level| level.score())
}

/// Ordinal score of a stored understanding label; unknown labels score 0.
pub fn understanding_score(value: &str) -> u8 {
    UnderstandingLevel::parse(value).map_or(0, |level| level.score())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_table_matches_ordinals() {
        assert_eq!(engagement_score("Unattentive"), 1);
        assert_eq!(engagement_score("Distracted"), 2);
        assert_eq!(engagement_score("Neutral"), 3);
        assert_eq!(engagement_score("Engaged"), 4);
        assert_eq!(engagement_score("Highly Engaged"), 5);
    }

    #[test]
    fn understanding_table_matches_ordinals() {
        assert_eq!(understanding_score("Poor"), 1);
        assert_eq!(understanding_score("Needs Improvement"), 2);
        assert_eq!(understanding_score("Fair"), 3);
        assert_eq!(understanding_score("Good"), 4);
        assert_eq!(understanding_score("Excellent"), 5);
    }

    #[test]
    fn unknown_labels_score_zero() {
        assert_eq!(engagement_score("Super Engaged"), 0);
        assert_eq!(engagement_score(""), 0);
        assert_eq!(understanding_score("good"), 0);
        assert_eq!(understanding_score("Outstanding"), 0);
    }

    #[test]
    fn labels_round_trip_through_parse() {
        for level in EngagementLevel::ALL {
            assert_eq!(EngagementLevel::parse(level.as_str()), Some(level));
        }
        for level in UnderstandingLevel::ALL {
            assert_eq!(UnderstandingLevel::parse(level.as_str()), Some(level));
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(understanding_score("  Fair "), 3);
    }
}
