mod property_planner_tests;
mod uct_tests;
