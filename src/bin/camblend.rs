use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use camblend::{
    BlendEase, CameraPose, CameraRigAsset, CameraRigLayer, CameraRigTransition,
    CameraSystemEvaluator, CameraSystemSettings, DVec3, EvaluationContext,
    SimpleBlendCameraNode, SwitchableCameraDirector,
    nodes::{ArrayCameraNode, DampenPositionCameraNode, FieldOfViewCameraNode, OffsetCameraNode},
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "camblend", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a two-rig scene through the camera system and print every frame's view.
    Simulate(SimulateArgs),
    /// Print the default camera system settings, or validate a settings file.
    Settings(SettingsArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Number of frames to evaluate.
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Seconds per frame.
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,

    /// Frame at which the scene switches to the second rig (defaults to a quarter in).
    #[arg(long)]
    switch_at: Option<u32>,

    /// Duration of the blend into the second rig.
    #[arg(long, default_value_t = 1.0)]
    blend_seconds: f32,

    /// Ease curve of the blend (linear, in_quad, out_quad, in_out_quad, in_cubic,
    /// out_cubic, in_out_cubic, smooth).
    #[arg(long, default_value = "smooth")]
    ease: String,

    /// Settings JSON for the camera system.
    #[arg(long = "settings")]
    settings_path: Option<PathBuf>,

    /// Print one JSON object per frame.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct SettingsArgs {
    /// Settings JSON to validate instead of printing the defaults.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Settings(args) => cmd_settings(args),
    }
}

fn read_settings(path: &Path) -> anyhow::Result<CameraSystemSettings> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read settings '{}'", path.display()))?;
    CameraSystemSettings::from_json_str(&text)
        .with_context(|| format!("parse settings '{}'", path.display()))
}

fn cmd_settings(args: SettingsArgs) -> anyhow::Result<()> {
    let settings = match &args.in_path {
        Some(path) => read_settings(path)?,
        None => CameraSystemSettings::default(),
    };
    println!("{}", settings.to_json_string()?);
    Ok(())
}

fn follow_rig() -> Arc<CameraRigAsset> {
    CameraRigAsset::builder("follow")
        .root_node(Arc::new(ArrayCameraNode::new(
            "follow",
            vec![
                Arc::new(OffsetCameraNode::new(DVec3::new(-300.0, 0.0, 120.0))),
                Arc::new(FieldOfViewCameraNode::new(75.0)),
            ],
        )))
        .build()
}

fn aim_rig(blend_seconds: f32, ease: BlendEase) -> Arc<CameraRigAsset> {
    CameraRigAsset::builder("aim")
        .root_node(Arc::new(ArrayCameraNode::new(
            "aim",
            vec![
                Arc::new(OffsetCameraNode::new(DVec3::new(-120.0, 45.0, 70.0))),
                Arc::new(DampenPositionCameraNode::new(8.0)),
                Arc::new(FieldOfViewCameraNode::new(50.0)),
            ],
        )))
        .enter_transition(CameraRigTransition::new(SimpleBlendCameraNode::shared(
            blend_seconds,
            ease,
        )))
        .build()
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let ease = BlendEase::parse(&args.ease)
        .with_context(|| format!("unknown ease '{}'", args.ease))?;
    anyhow::ensure!(args.dt > 0.0, "--dt must be positive");
    let settings = match &args.settings_path {
        Some(path) => read_settings(path)?,
        None => CameraSystemSettings::default(),
    };

    let mut system = CameraSystemEvaluator::new(settings)?;
    let director = SwitchableCameraDirector::new();
    let handle = director.handle();
    let mut pose = CameraPose::default();
    pose.set_location(DVec3::ZERO);
    let player = EvaluationContext::builder("player")
        .initial_pose(pose)
        .director(Box::new(director))
        .build();
    system.push_evaluation_context(&player);

    let follow = follow_rig();
    let aim = aim_rig(args.blend_seconds, ease);
    let switch_at = args.switch_at.unwrap_or(args.frames / 4);
    handle.set_camera_rig(Some(Arc::clone(&follow)));

    for frame in 0..args.frames {
        if frame == switch_at {
            handle.set_camera_rig(Some(Arc::clone(&aim)));
        }
        // The player walks forward at a steady pace.
        let walked = f64::from(frame) * f64::from(args.dt) * 200.0;
        player
            .initial_result_mut()
            .camera_pose
            .set_location(DVec3::new(walked, 0.0, 0.0));

        system.update(args.dt);
        let view = system
            .evaluated_camera_view()
            .context("camera system produced no view")?;
        let rigs = system
            .layer(CameraRigLayer::Main)
            .map(|stack| stack.camera_rig_names().join(","))
            .unwrap_or_default();

        if args.json {
            let line = serde_json::json!({
                "frame": frame,
                "view": view,
                "main_layer": rigs,
            });
            println!("{line}");
        } else {
            let l = view.location;
            println!(
                "frame {frame:>4}  loc ({:>8.2}, {:>7.2}, {:>7.2})  fov {:>5.1}{}  [{rigs}]",
                l.x,
                l.y,
                l.z,
                view.field_of_view,
                if view.is_camera_cut { "  cut" } else { "" },
            );
        }
    }

    Ok(())
}
