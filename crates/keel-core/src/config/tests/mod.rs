// Configuration test module
#[cfg(test)]
mod document_tests;
#[cfg(test)]
mod params_tests;
