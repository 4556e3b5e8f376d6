//! Standalone HTML export.
//!
//! Produces a single self-running document: the three sources embedded
//! verbatim (re-indented only), a preamble that constructs a handle per
//! registered asset and defers the first start-code invocation until every
//! asset finishes loading, a reimplementation of the runner's accumulator
//! loop, and raw input listeners matching the sandbox's input contract. The
//! document needs no other files.

use crate::asset::AssetKind;
use crate::project::ProjectRecord;

/// Re-indents a source fragment so it nests inside the generated document.
/// The text itself is untouched — every line just gains the same prefix.
fn indent(source: &str, spaces: usize) -> String {
    source.replace('\n', &format!("\n{}", " ".repeat(spaces)))
}

/// JS object literal mapping asset names to URLs for one kind, plus the loop
/// that turns each URL into a loading handle.
fn asset_preamble(record: &ProjectRecord, kind: AssetKind) -> String {
    let (var, ctor, load_event) = match kind {
        AssetKind::Image => ("images", "Image()", "load"),
        AssetKind::Sound => ("sounds", "Audio()", "loadeddata"),
    };

    let mut out = format!("const {} = {{", var);
    for (name, descriptor) in &record.assets {
        if descriptor.kind == kind {
            out.push_str(&format!("\n      '{}': '{}',", name, descriptor.url));
        }
    }
    out.push_str("\n    };\n\n");
    out.push_str(&format!("    for (let name in {}) {{\n", var));
    out.push_str(&format!("      const url = {}[name];\n", var));
    out.push_str(&format!("      {}[name] = new {};\n", var, ctor));
    out.push_str(&format!(
        "      {}[name].addEventListener('{}', loadedAsset);\n",
        var, load_event
    ));
    out.push_str(&format!("      {}[name].src = url;\n", var));
    out.push_str("    }");
    out
}

/// Generates the complete standalone document.
pub fn export_html(title: &str, record: &ProjectRecord, frame_interval_ms: f64) -> String {
    let total_assets = record.assets.len();
    let image_preamble = asset_preamble(record, AssetKind::Image);
    let sound_preamble = asset_preamble(record, AssetKind::Sound);
    let start_src = indent(&record.start, 6);
    let update_src = indent(&record.update, 8);
    let draw_src = indent(&record.draw, 8);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>* {{margin: 0;padding: 0;border: 0;}}body {{overflow: hidden;background-color:#212223}}canvas{{display: block;}}canvas.scene{{margin:42px auto;border:1px solid #2c2d2e;}}</style>
</head>
<body>
  <canvas></canvas>
  <script>

    const canvas = document.querySelector('canvas');
    const context = canvas.getContext('2d');
    const PI = Math.PI;
    const PI2 = 2 * PI;

    let keyDown = {{}};
    let keyUp = {{}};
    let width = canvas.width = innerWidth;
    let height = canvas.height = innerHeight;
    let frameTime = {frame_interval_ms};
    let lastTime = performance.now();
    let accumulatedTime = 0;
    let canvasSized = false;
    let loadedAssetSize = 0;
    let totalAssetSize = {total_assets};

    const mouse = {{
      x: 0,
      y: 0,
      pressed: false,
      released: false,
    }};

    const key = {{
      pressed: (keyCode) => keyDown[keyCode],
      released: (keyCode) => keyUp[keyCode],
    }};

    {image_preamble}

    {sound_preamble}

    function resize() {{
      width = canvas.width = innerWidth;
      height = canvas.height = innerHeight;
    }}

    function setSize(w, h) {{
      canvas.width = w;
      canvas.height = h;
      width = w;
      height = h;
      canvasSized = true;
      canvas.className = 'scene';
    }}

    function loadedAsset() {{
      loadedAssetSize += 1;
      if (loadedAssetSize == totalAssetSize) {{
        init();
      }}
    }}

    function sound(name) {{
      return sounds[name];
    }}

    function image(name) {{
      return images[name];
    }}

    function init() {{
      {start_src}

      function update(deltaTime) {{
        {update_src}
      }}

      function draw() {{
        {draw_src}
      }}

      function render() {{
        let currentTime = performance.now();
        let elapsedTime = currentTime - lastTime;
        lastTime = currentTime;
        accumulatedTime += elapsedTime;

        while (accumulatedTime >= frameTime) {{
          update(frameTime / 1000);
          accumulatedTime -= frameTime;
        }}

        draw();
        keyUp = {{}};
        mouse.released = false;
        requestAnimationFrame(render);
      }}

      requestAnimationFrame(render);
      if (!canvasSized) {{
        addEventListener('resize', resize);
        resize();
      }}
    }}

    window.addEventListener('keydown', (e) => {{
      keyDown[e.keyCode] = true;
    }});
    window.addEventListener('keyup', (e) => {{
      keyDown[e.keyCode] = false;
      keyUp[e.keyCode] = true;
    }});
    canvas.addEventListener('mousedown', (e) => {{
      mouse.pressed = true;
    }});
    canvas.addEventListener('mouseup', (e) => {{
      mouse.pressed = false;
      mouse.released = true;
    }});
    canvas.addEventListener('mousemove', (e) => {{
      const bounds = canvas.getBoundingClientRect();
      mouse.x = e.clientX - bounds.left;
      mouse.y = e.clientY - bounds.top;
    }});

    if (totalAssetSize === 0) {{
      init();
    }}
  </script>
</body>
</html>"#
    )
}
