pub mod cities;
pub mod stream;
pub mod visits;

use serde::Serialize;

#[derive(Serialize)]
struct CitiesBody {
    cities: Vec<String>,
}
