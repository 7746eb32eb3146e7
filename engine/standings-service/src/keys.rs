//! Cache key layout

/// Competition configuration table
pub const COMPETITION: &str = "competition";
/// General config sheet (sales update time)
pub const CONFIG: &str = "config";
/// Store metadata table
pub const STORE: &str = "store";
/// Competition rules text
pub const RULES: &str = "rules";
/// Title prefix of matchup sheets, also the prefix of their keys
pub const MATCHUP_PREFIX: &str = "Matchup";

/// Key of one group's matchup sheet
pub fn matchup(competition: &str, stage: &str, group: &str) -> String {
    format!("{MATCHUP_PREFIX}-{competition}-{stage}-{group}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matchup_key() {
        assert_eq!(matchup("Champion", "Qualifier", "Group_1_Store"), "Matchup-Champion-Qualifier-Group_1_Store");
    }
}
