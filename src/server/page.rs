//! HTML for the two-column explorer page. Plotly draws the plot client-side from `/api/plot`;
//! clicks are posted to `/api/select` and the returned view fills the details column.

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>{{TITLE}}</title>
  <link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>🔬</text></svg>" />
  <style>
    body { font-family: Arial, sans-serif; margin: 24px; }
    h1 { margin-bottom: 16px; }
    .columns { display: grid; grid-template-columns: 3fr 1fr; gap: 24px; }
    .info { background: #e8f1fb; color: #0b4f8a; border-radius: 6px; padding: 12px; }
    .error { background: #fdecea; color: #8a1c13; border-radius: 6px; padding: 12px; }
    .warning { background: #fff4e5; color: #7a4b00; border-radius: 6px; padding: 8px; margin-bottom: 8px; }
    #details p { margin: 6px 0; }
  </style>
</head>
<body>
  <h1>Interactive CO2 Capture Materials Database</h1>
"#;

/// Full page: plot on the left, details on the right.
pub fn index_html(page_title: &str) -> String {
    let mut html = HEAD.replace("{{TITLE}}", &escape_html(page_title));
    html.push_str(BODY);
    html
}

/// Page shown when the dataset can't be loaded. Nothing below the message is rendered.
pub fn error_html(page_title: &str, message: &str) -> String {
    let mut html = HEAD.replace("{{TITLE}}", &escape_html(page_title));
    html.push_str(&format!(
        "  <div class=\"error\">{}</div>\n</body>\n</html>\n",
        escape_html(message)
    ));
    html
}

const BODY: &str = r#"  <div class="columns">
    <section>
      <h2>Material Capacity</h2>
      <div id="plot"></div>
    </section>
    <section>
      <h2>Material Details</h2>
      <div id="details"></div>
    </section>
  </div>
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
  <script>
    const details = document.getElementById('details');
    let session = null;

    function renderView(response) {
      details.replaceChildren();
      if (response.warning) {
        const warn = document.createElement('div');
        warn.className = 'warning';
        warn.textContent = response.warning;
        details.appendChild(warn);
      }
      const view = response.view;
      if (view.view === 'placeholder') {
        const info = document.createElement('div');
        info.className = 'info';
        info.textContent = view.message;
        details.appendChild(info);
        return;
      }
      const title = document.createElement('h3');
      title.textContent = view.title;
      details.appendChild(title);
      for (const entry of view.entries) {
        const p = document.createElement('p');
        const label = document.createElement('strong');
        label.textContent = entry.label + ': ';
        p.appendChild(label);
        if (entry.kind === 'link') {
          const a = document.createElement('a');
          a.href = entry.href;
          a.target = '_blank';
          a.rel = 'noopener';
          a.textContent = entry.text;
          p.appendChild(a);
        } else {
          p.appendChild(document.createTextNode(entry.value));
        }
        details.appendChild(p);
      }
    }

    async function select(position) {
      const response = await fetch('/api/select', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ session: session, position: position }),
      });
      const payload = await response.json();
      if (response.ok) renderView(payload);
    }

    async function start() {
      const created = await fetch('/api/session', { method: 'POST' }).then(r => r.json());
      session = created.session;
      renderView(created);

      const response = await fetch('/api/plot');
      const spec = await response.json();
      if (!response.ok) {
        document.getElementById('plot').textContent = spec.message;
        return;
      }
      const trace = {
        type: 'scatter',
        mode: 'markers',
        x: spec.points.map(p => p.x),
        y: spec.points.map(p => p.y),
        customdata: spec.points.map(p => [p.material]),
        hovertemplate: spec.hover_template,
      };
      const layout = {
        height: spec.height,
        xaxis: { title: { text: spec.x_label } },
        yaxis: { title: { text: spec.y_label } },
        margin: { t: 24 },
      };
      const plot = document.getElementById('plot');
      await Plotly.newPlot(plot, [trace], layout, { responsive: true });
      plot.on('plotly_click', event => {
        if (event.points && event.points.length) select(event.points[0].pointNumber);
      });
    }

    start();
  </script>
</body>
</html>
"#;
