#[cfg(test)]
mod crash_tests;
#[cfg(test)]
mod signals_tests;
