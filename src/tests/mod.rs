mod property_tests;
mod rule_soundness_tests;
mod settings_tests;
