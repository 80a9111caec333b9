use slippy::{InputEvent, Map, MapConfig, MapPosition, Marker, Point};
use std::thread;
use std::time::Duration;

/// Example of driving the engine without any UI: tick frames by hand and
/// inspect the layer state a host shell would render.
fn main() -> slippy::Result<()> {
    env_logger::init();

    let config = MapConfig::default()
        .with_zoom_limits(2.0, 18.0)
        .with_position(MapPosition::new(47.20696, -1.560413, 12.0));
    let mut map = Map::new(config, Point::new(1024.0, 768.0));

    map.on("zoomchanged", |event| {
        println!("   notification: {:?}", event);
    });

    map.add_object(Box::new(Marker::new(47.20696, -1.560413)?));

    println!("Slippy headless example");
    println!("=======================");
    let position = map.position();
    println!(
        "Start: {:.4}, {:.4} at zoom {}",
        position.lat, position.lng, position.zoom
    );

    // Let a few frames pass so tile fetches can land
    for _ in 0..30 {
        map.tick();
        thread::sleep(Duration::from_millis(33));
    }
    report(&map);

    println!("\nPanning east...");
    map.handle_input(InputEvent::Drag {
        delta: Point::new(-300.0, 0.0),
    });
    map.tick();
    report(&map);

    println!("\nZooming in to 13...");
    map.zoom(13.0);
    for _ in 0..30 {
        map.tick();
        thread::sleep(Duration::from_millis(33));
    }
    report(&map);

    Ok(())
}

fn report(map: &Map) {
    let position = map.position();
    let bounds = map.bounds();
    println!(
        "Center {:.4}, {:.4} zoom {:.1}",
        position.lat, position.lng, position.zoom
    );
    println!(
        "Bounds lat [{:.4}, {:.4}] lon [{:.4}, {:.4}]",
        bounds.lat_bottom, bounds.lat_top, bounds.lon_right, bounds.lon_left
    );
    for layer in map.layers() {
        let ready = layer.tiles().iter().filter(|tile| tile.is_ready()).count();
        println!(
            "Layer z{}: {} tiles ({} ready), cache {}/{}",
            layer.zoom(),
            layer.len(),
            ready,
            map.cache().len(),
            map.cache().capacity()
        );
    }
}
