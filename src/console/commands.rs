use crate::domain::Coordinate;

pub const HELP: &str = "\
Commands:
  draw LON,LAT LON,LAT LON,LAT ...   draw a polygon (ring is closed for you)
  search                             query properties inside the drawn polygon
  clear                              delete drawings and reload all properties
  click LON LAT                      click the map (cluster zooms, point shows popup)
  zoom Z                             set the map zoom level
  list                               show what the map currently displays
  status                             show the loaded dataset and any pending fetch
  help                               show this help
  quit                               exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Draw(Vec<Coordinate>),
    Search,
    Clear,
    Click(Coordinate),
    Zoom(f64),
    List,
    Status,
    Help,
    Quit,
}

fn number(raw: &str, what: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{what} must be a number, got '{raw}'"))?;
    if !value.is_finite() {
        return Err(format!("{what} must be finite, got '{raw}'"));
    }
    Ok(value)
}

fn coordinate(lon: &str, lat: &str) -> Result<Coordinate, String> {
    let lon = number(lon, "longitude")?;
    let lat = number(lat, "latitude")?;
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("({lon}, {lat}) is outside WGS84 bounds"));
    }
    Ok(Coordinate::new(lon, lat))
}

/// Parses one prompt line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match (word.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("search", []) => Command::Search,
        ("clear", []) => Command::Clear,
        ("list", []) => Command::List,
        ("status", []) => Command::Status,
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        ("click", [lon, lat]) => Command::Click(coordinate(lon, lat)?),
        ("zoom", [z]) => Command::Zoom(number(z, "zoom")?),
        ("draw", pairs) if pairs.len() >= 3 => {
            let vertices = pairs
                .iter()
                .map(|pair| {
                    let (lon, lat) = pair
                        .split_once(',')
                        .ok_or_else(|| format!("expected LON,LAT, got '{pair}'"))?;
                    coordinate(lon, lat)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Command::Draw(vertices)
        }
        ("draw", _) => return Err("draw needs at least 3 LON,LAT vertices".to_string()),
        (other, _) => return Err(format!("unknown command or wrong arguments: '{other}' (try help)")),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("search"), Ok(Some(Command::Search)));
        assert_eq!(parse_command("  CLEAR "), Ok(Some(Command::Clear)));
        assert_eq!(parse_command("exit"), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("Status"), Ok(Some(Command::Status)));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn parses_draw_vertices() {
        let parsed = parse_command("draw -111.9,40.7 -111.8,40.7 -111.8,40.8").unwrap();
        assert_eq!(
            parsed,
            Some(Command::Draw(vec![
                Coordinate::new(-111.9, 40.7),
                Coordinate::new(-111.8, 40.7),
                Coordinate::new(-111.8, 40.8),
            ]))
        );
    }

    #[test]
    fn parses_click_and_zoom() {
        assert_eq!(
            parse_command("click 1.5 -2"),
            Ok(Some(Command::Click(Coordinate::new(1.5, -2.0))))
        );
        assert_eq!(parse_command("zoom 12"), Ok(Some(Command::Zoom(12.0))));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("draw 0,0 1,1").is_err());
        assert!(parse_command("draw 0,0 1;1 2,2").is_err());
        assert!(parse_command("click 200 0").is_err());
        assert!(parse_command("zoom fast").is_err());
        assert!(parse_command("search now").is_err());
        assert!(parse_command("status all").is_err());
        assert!(parse_command("fly").is_err());
    }
}
