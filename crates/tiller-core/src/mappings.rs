//! Static lookups from the C# scripting API to the game's builtins.
//!
//! Every table is closed: a miss is an ordinary outcome and callers fall
//! back to the default name transformation.

/// Static class that hosts the game API in C#.
pub const API_CLASS: &str = "TFWR";

/// API method name -> game builtin.
pub fn builtin(method: &str) -> Option<&'static str> {
    Some(match method {
        "Harvest" => "harvest",
        "CanHarvest" => "can_harvest",
        "Plant" => "plant",
        "Move" => "move",
        "CanMove" => "can_move",
        "Swap" => "swap",
        "Till" => "till",
        "GetPosX" => "get_pos_x",
        "GetPosY" => "get_pos_y",
        "GetWorldSize" => "get_world_size",
        "GetEntityType" => "get_entity_type",
        "GetGroundType" => "get_ground_type",
        "GetTime" => "get_time",
        "GetTickCount" => "get_tick_count",
        "UseItem" => "use_item",
        "GetWater" => "get_water",
        "DoAFlip" => "do_a_flip",
        "PetThePiggy" => "pet_the_piggy",
        "Print" => "print",
        "SetExecutionSpeed" => "set_execution_speed",
        "SetWorldSize" => "set_world_size",
        "NumItems" => "num_items",
        "GetCost" => "get_cost",
        "Clear" => "clear",
        "GetCompanion" => "get_companion",
        "Unlock" => "unlock",
        "NumUnlocked" => "num_unlocked",
        "Measure" => "measure",
        "LeaderboardRun" => "leaderboard_run",
        "Simulate" => "simulate",
        "QuickPrint" => "quick_print",
        "ChangeHat" => "change_hat",
        "SpawnDrone" => "spawn_drone",
        "WaitFor" => "wait_for",
        "HasFinished" => "has_finished",
        "MaxDrones" => "max_drones",
        "NumDrones" => "num_drones",
        _ => return None,
    })
}

/// Enum type -> namespace the game exposes its constants under.
pub fn enum_prefix(type_name: &str) -> Option<&'static str> {
    Some(match type_name {
        "Entity" => "Entities",
        "Item" => "Items",
        "Ground" => "Grounds",
        "Hat" => "Hats",
        "Leaderboard" => "Leaderboards",
        "Unlock" => "Unlocks",
        _ => return None,
    })
}

/// Direction value -> the compass constant the game defines.
/// Screen-relative aliases fold onto compass directions.
pub fn direction(value: &str) -> Option<&'static str> {
    Some(match value {
        "North" | "Up" => "North",
        "East" | "Right" => "East",
        "South" | "Down" => "South",
        "West" | "Left" => "West",
        _ => return None,
    })
}

/// `Math.X` host function -> game global.
pub fn host_function(class: &str, method: &str) -> Option<&'static str> {
    match (class, method) {
        ("Math", "Min") => Some("min"),
        ("Math", "Max") => Some("max"),
        ("Math", "Abs") => Some("abs"),
        _ => None,
    }
}

/// Container methods that mutate their receiver.
pub fn is_mutating_method(method: &str) -> bool {
    matches!(
        method,
        "Add" | "Remove" | "RemoveAt" | "Insert" | "Clear" | "Push" | "Pop" | "Enqueue" | "Dequeue"
    )
}

/// LINQ-style bulk query operators; the dialect has no equivalent.
pub fn is_bulk_query(method: &str) -> bool {
    matches!(
        method,
        "Where"
            | "Select"
            | "SelectMany"
            | "Any"
            | "All"
            | "OrderBy"
            | "OrderByDescending"
            | "ThenBy"
            | "ThenByDescending"
            | "First"
            | "FirstOrDefault"
            | "Last"
            | "LastOrDefault"
            | "Single"
            | "SingleOrDefault"
            | "Sum"
            | "Average"
            | "Aggregate"
            | "Distinct"
            | "GroupBy"
            | "Skip"
            | "Take"
            | "ToList"
            | "ToArray"
            | "ToDictionary"
            | "ToHashSet"
            | "Zip"
    )
}
