use super::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn submit_goal_request_survives_a_json_round_trip(goal in "\\PC{0,40}", n_tools in 0..4usize) {
        let req = SubmitGoalRequest {
            goal: goal.clone(),
            allowed_tools: (0..n_tools).map(|i| format!("tool_{i}")).collect(),
            permissions: Default::default(),
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: SubmitGoalRequest = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.goal, goal);
        prop_assert_eq!(back.allowed_tools, req.allowed_tools);
    }

    #[test]
    fn rewind_request_new_tool_survives_a_json_round_trip(tool in "[a-z_]{0,20}") {
        let req = RewindRequest { new_args: None, new_tool: Some(tool.clone()) };
        let json = serde_json::to_string(&req).unwrap();
        let back: RewindRequest = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.new_tool, Some(tool));
    }
}
