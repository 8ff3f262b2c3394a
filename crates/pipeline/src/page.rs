//! The single HTML page that hands a [`MapDocument`] to Leaflet.
//!
//! The template is kept as a `&'static str` and the document is spliced in as
//! JSON, so the browser side never sees anything but the composed document.

use shared::protocol::MapDocument;

use crate::mapper::escape_html;

const DOCUMENT_SLOT: &str = "__MAP_DOCUMENT__";
const TITLE_SLOT: &str = "__TITLE__";

pub const PAGE_TITLE: &str = "Earthquakes of the Past Month";

const MAP_PAGE_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>__TITLE__</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; padding: 0; }
    .legend { background: white; padding: 6px 10px; line-height: 20px; border-radius: 4px; }
    .legend i { display: inline-block; width: 18px; height: 14px; margin-right: 6px; }
    .notices { position: absolute; top: 10px; left: 60px; z-index: 1000; max-width: 420px; }
    .notices div { background: #fff3cd; border: 1px solid #d39e00; padding: 6px 10px; margin-bottom: 4px; border-radius: 4px; }
  </style>
</head>
<body>
  <div id="map"></div>
  <div id="notices" class="notices"></div>
  <script id="map-document" type="application/json">__MAP_DOCUMENT__</script>
  <script>
    const doc = JSON.parse(document.getElementById("map-document").textContent);

    function shapesLayer(style, geojson) {
      return L.geoJSON(geojson, { style: () => ({ color: style.color, weight: style.weight }) });
    }

    function notice(text) {
      const div = document.createElement("div");
      div.textContent = text;
      document.getElementById("notices").appendChild(div);
    }

    function overlayLayer(content) {
      const payload = content.payload;
      switch (content.type) {
        case "circles":
          return L.layerGroup(payload.markers.map((m) =>
            L.circle([m.position.lat, m.position.lng], {
              stroke: payload.style.stroke,
              color: payload.style.color,
              fillOpacity: payload.style.fill_opacity,
              fillColor: m.fill_color,
              radius: m.radius,
            }).bindPopup(m.popup_html)));
        case "shapes":
          return shapesLayer(payload.style, payload.geojson);
        case "remote_shapes": {
          const group = L.layerGroup();
          fetch(payload.source)
            .then((res) => { if (!res.ok) throw new Error(res.status + " " + res.statusText); return res.json(); })
            .then((geojson) => shapesLayer(payload.style, geojson).addTo(group))
            .catch((err) => notice("Could not load " + payload.source + ": " + err.message));
          return group;
        }
        default:
          return L.layerGroup();
      }
    }

    const baseMaps = {};
    for (const base of doc.base_layers) {
      baseMaps[base.name] = L.tileLayer(base.url_template, Object.assign({ attribution: base.attribution }, base.options));
    }
    const overlayMaps = {};
    const initial = [baseMaps[doc.active_base_layer]].filter(Boolean);
    for (const overlay of doc.overlays) {
      const layer = overlayLayer(overlay.content);
      overlayMaps[overlay.name] = layer;
      if (overlay.visible_on_load) initial.push(layer);
    }

    const map = L.map("map", {
      center: [doc.viewport.center.lat, doc.viewport.center.lng],
      zoom: doc.viewport.zoom,
      layers: initial,
    });
    L.control.layers(baseMaps, overlayMaps, { collapsed: doc.layer_control.collapsed }).addTo(map);

    const legend = L.control({ position: doc.legend.position });
    legend.onAdd = function () {
      const div = L.DomUtil.create("div", "info legend");
      const title = document.createElement("strong");
      title.textContent = doc.legend.title;
      div.appendChild(title);
      for (const entry of doc.legend.entries) {
        const row = document.createElement("div");
        const swatch = document.createElement("i");
        swatch.style.background = entry.color;
        row.appendChild(swatch);
        row.appendChild(document.createTextNode(entry.label));
        div.appendChild(row);
      }
      return div;
    };
    legend.addTo(map);

    (doc.notices || []).forEach(notice);
  </script>
</body>
</html>
"#;

/// Renders the page for `document`.
///
/// The JSON is embedded in a `<script>` element, so every `<` is written as
/// `\u003c` to keep a `</script>` inside popup text from closing it early.
pub fn render_page(document: &MapDocument) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(document)?.replace('<', "\\u003c");
    Ok(MAP_PAGE_HTML
        .replacen(TITLE_SLOT, &escape_html(PAGE_TITLE), 1)
        .replacen(DOCUMENT_SLOT, &json, 1))
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
