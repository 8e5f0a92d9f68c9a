#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const HEADER: &str =
    "Title,Genre,Director,Cast,Budget_Cr,BoxOffice_Cr,IMDb_Rating,Release_Date";

/// Six movies: one missing rating, one missing box office (dropped),
/// one without a genre and an unparseable date.
pub const MOVIES_CSV: &str = "\
Title,Genre,Director,Cast,Budget_Cr,BoxOffice_Cr,IMDb_Rating,Release_Date
Alpha,Action,Ravi Kumar,\"Aamir Khan, Kajol\",100,500,8.0,2023-01-15
Beta,Drama,Meera Nair,\"Kajol, Tabu\",20,60,7.0,2023-02-10
Gamma,Action,Ravi Kumar,Aamir Khan,80,300,,2023-02-20
Delta,Comedy,Anil Sharma,Tabu,15,45,6.0,2023-03-05
Epsilon,Drama,Meera Nair,Kajol,30,,7.5,2023-04-01
Zeta,,Anil Sharma,Tabu,10,20,5.5,not-a-date
";

/// The three-row example: X lacks a rating, the untitled row is dropped.
pub const SCENARIO_A_CSV: &str = "\
Title,Genre,Director,Cast,Budget_Cr,BoxOffice_Cr,IMDb_Rating,Release_Date
X,Action,Dir X,Actor X,10,50,,2024-05-01
Y,Drama,Dir Y,Actor Y,20,30,8.0,2024-06-01
,Action,Dir Z,Actor Z,5,5,6.0,2024-07-01
";

/// Directors: A five times, B three times, then C, D, E once each (first seen C, D, E).
pub fn directors_csv() -> String {
    let directors = ["C", "A", "A", "B", "D", "A", "B", "A", "E", "B", "A"];
    let mut csv = format!("{HEADER}\n");
    for (i, director) in directors.iter().enumerate() {
        csv.push_str(&format!(
            "Movie {i},Action,{director},Someone,{},{},7.0,2024-01-01\n",
            10 + i,
            100 + i
        ));
    }
    csv
}

/// Write `content` to `name` inside a fresh temp dir. Keep the TempDir alive while it is used.
pub fn write_dataset(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write dataset");
    (dir, path)
}
