//! End-to-end walk through the scene transition protocol: load a scene,
//! evict against the next scene's manifest, load the next scene, with a
//! persistent player selection riding across the transition.

use std::sync::Arc;

use stagehand::{AssetEngine, Category, Descriptor, Manifest, MemoryAssetSource};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    let pixels = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 180, 40, 255]));
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .expect("png encodes");
    bytes
}

fn hdr_bytes(width: usize, height: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    let pixels = vec![image::Rgb([0.2f32, 0.4, 1.6]); width * height];
    image::codecs::hdr::HdrEncoder::new(&mut bytes)
        .encode(&pixels, width, height)
        .expect("hdr encodes");
    bytes
}

fn wav_bytes(sample_count: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = std::io::Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut bytes, spec).expect("wav writer");
    for i in 0..sample_count {
        writer
            .write_sample((i as i16).wrapping_mul(64))
            .expect("sample writes");
    }
    writer.finalize().expect("wav finalizes");
    bytes.into_inner()
}

fn populated_source() -> MemoryAssetSource {
    let source = MemoryAssetSource::new();
    source.insert(
        "models/robot.json",
        br#"{
            "nodes": [ {
                "name": "body",
                "mesh": {
                    "positions": [0,0,0, 1,0,0, 0,1,0],
                    "indices": [0, 1, 2],
                    "material": { "texture": "tex/robot_diffuse.png" }
                }
            } ],
            "animations": [ { "name": "walk", "duration": 2.0 } ]
        }"#
        .to_vec(),
    );
    source.insert(
        "models/guide.json",
        br#"{
            "nodes": [ { "name": "guide", "mesh": { "positions": [0,0,0, 0,1,0, 1,1,0] } } ],
            "animations": [ { "name": "idle", "duration": 4.0 } ]
        }"#
        .to_vec(),
    );
    source.insert(
        "models/knight.json",
        br#"{ "nodes": [ { "name": "knight", "mesh": { "positions": [0,0,0, 1,0,0, 1,1,0] } } ] }"#
            .to_vec(),
    );
    source.insert("tex/robot_diffuse.png", png_bytes(4, 4));
    source.insert("tex/wall.png", png_bytes(8, 8));
    source.insert("env/studio.hdr", hdr_bytes(4, 2));
    for face in ["px", "nx", "py", "ny", "pz", "nz"] {
        source.insert(format!("env/sky/{}.png", face), png_bytes(8, 8));
    }
    source.insert("audio/wind.wav", wav_bytes(128));
    source.insert("audio/chime.wav", wav_bytes(32));
    source.insert(
        "vfx/sparks.json",
        br#"{ "maxParticles": 128, "lifetime": [0.1, 0.6] }"#.to_vec(),
    );
    source.insert(
        "paths/patrol.json",
        br#"{ "paths": [ { "name": "loop", "points": [[0,0,0]], "curves": [ { "points": [[1,0,0]] } ] } ] }"#
            .to_vec(),
    );
    source.insert("data/dialog.json", br#"{ "lines": ["hello"] }"#.to_vec());
    source.insert(
        "fonts/display.json",
        br#"{ "family": "Display", "glyphs": { "A": { "advance": 0.6 } } }"#.to_vec(),
    );
    source.insert("ui/icon.svg", br#"<svg viewBox="0 0 8 8"/>"#.to_vec());
    source
}

fn scene_one() -> Manifest {
    Manifest::from_json(
        br#"{
            "models": [ { "name": "robot", "locator": "models/robot.json", "scale": 0.5 } ],
            "characters": [ { "name": "guide", "locator": "models/guide.json" } ],
            "textures": [ { "name": "wall", "locator": "tex/wall.png" } ],
            "videoTextures": [ { "name": "intro", "locator": "video/intro.mp4" } ],
            "audios": [ { "name": "wind", "locator": "audio/wind.wav", "looping": true } ],
            "hdris": [ { "name": "studio", "locator": "env/studio.hdr" } ],
            "cubeMaps": [ { "name": "sky", "locator": "env/sky" } ],
            "vfxs": [ { "name": "sparks", "locator": "vfx/sparks.json" } ],
            "pathFiles": [ { "name": "patrol", "locator": "paths/patrol.json" } ],
            "jsonFiles": [ { "name": "dialog", "locator": "data/dialog.json" } ],
            "fonts": [ { "name": "display", "locator": "fonts/display.json" } ],
            "svgs": [ { "name": "icon", "locator": "ui/icon.svg" } ]
        }"#,
    )
    .expect("scene one parses")
}

fn scene_two() -> Manifest {
    Manifest::from_json(
        br#"{
            "models": [ { "name": "robot", "locator": "models/robot.json", "scale": 0.5 } ],
            "textures": [ { "name": "wall", "locator": "tex/wall.png" } ],
            "audios": [ { "name": "chime", "locator": "audio/chime.wav" } ]
        }"#,
    )
    .expect("scene two parses")
}

#[tokio::test]
async fn full_scene_walk_loads_evicts_and_reloads() {
    let source = Arc::new(populated_source());
    let engine = AssetEngine::new(source.clone());

    // Scene one: every category resolves before the scene is ready.
    let report = engine
        .load_manifest(&scene_one())
        .await
        .expect("scene one resolves");
    assert_eq!(report.requested, 12);
    assert_eq!(report.loaded, 12);
    assert_eq!(report.already_cached, 0);
    assert_eq!(engine.cache().len(), 12);

    let robot = engine.get(Category::Models, "robot").expect("robot cached");
    let scene = robot.as_scene().expect("robot is a scene graph");
    assert!(scene.animations.as_ref().expect("walk clip").action("walk").is_some());
    assert_eq!(
        engine
            .get(Category::CubeMaps, "sky")
            .expect("sky cached")
            .as_cube_map()
            .expect("sky is a cube map")
            .edge_length(),
        8
    );
    assert_eq!(
        engine
            .get(Category::PathFiles, "patrol")
            .expect("patrol cached")
            .as_paths()
            .expect("patrol is a path set")
            .path("loop")
            .expect("loop flattened")
            .len(),
        2
    );

    let wall = engine.get(Category::Textures, "wall").expect("wall cached");
    let wind = engine.get(Category::Audios, "wind").expect("wind cached");
    let intro = engine
        .get(Category::VideoTextures, "intro")
        .expect("intro cached");

    // A cross-scene user selection rides outside any manifest.
    let knight = engine
        .load_one(
            Category::SelectedPlayerModel,
            Descriptor::Model(stagehand::manifest::ModelDescriptor {
                name: "knight".to_owned(),
                locator: "models/knight.json".to_owned(),
                scale: None,
                cast_shadows: true,
            }),
        )
        .await
        .expect("selection loads");

    // Transition: scene two keeps robot and wall, drops the rest.
    let eviction = engine.evict_for_upcoming(&scene_two());
    assert_eq!(eviction.retained, 3); // robot, wall, persistent knight
    assert_eq!(eviction.disposed, 10);

    assert!(wind.is_disposed());
    assert!(intro.is_disposed());
    assert!(!wall.is_disposed());
    assert!(!knight.is_disposed());

    let kept_wall = engine.get(Category::Textures, "wall").expect("wall kept");
    assert!(Arc::ptr_eq(&kept_wall, &wall));
    assert!(engine.get(Category::Audios, "wind").is_none());
    assert!(engine.get(Category::Characters, "guide").is_none());
    assert!(engine.get(Category::SelectedPlayerModel, "knight").is_some());

    // Scene two: kept entries are reused, only the gap is loaded.
    let report = engine
        .load_manifest(&scene_two())
        .await
        .expect("scene two resolves");
    assert_eq!(report.already_cached, 2);
    assert_eq!(report.loaded, 1);

    let kept_robot = engine.get(Category::Models, "robot").expect("robot kept");
    assert!(Arc::ptr_eq(&kept_robot, &robot));
    assert!(engine.get(Category::Audios, "chime").is_some());

    // Reuse means reuse: one fetch per payload across both scenes.
    assert_eq!(source.fetch_count("models/robot.json"), 1);
    assert_eq!(source.fetch_count("tex/wall.png"), 1);
}
