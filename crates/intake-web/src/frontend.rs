//! Embedded single-page HTML frontend.
//!
//! A text area, an Analyze button, and a result panel with Action, Process
//! and Request Type.  Inline CSS and JavaScript only.

/// The complete HTML frontend as a static string.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Intake</title>
<style>
*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}
:root{
  --bg:#1a1a2e;
  --bg-secondary:#16213e;
  --bg-input:#0f3460;
  --text:#e4e4e4;
  --text-muted:#8a8a9a;
  --accent:#e94560;
  --accent-hover:#ff6b81;
  --border:#2a2a4a;
  --success:#4ecca3;
  --warning:#f0a500;
}
html,body{min-height:100%;font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,Helvetica,Arial,sans-serif;background:var(--bg);color:var(--text)}
.header{
  display:flex;align-items:center;justify-content:space-between;
  padding:12px 20px;background:var(--bg-secondary);border-bottom:1px solid var(--border);
}
.header h1{font-size:18px;font-weight:600;letter-spacing:.5px}
.header h1 span{color:var(--accent)}
.status{display:flex;align-items:center;gap:6px;font-size:13px;color:var(--text-muted)}
.status-dot{width:8px;height:8px;border-radius:50%;background:var(--warning)}
.status-dot.ready{background:var(--success)}
main{max-width:720px;margin:32px auto;padding:0 20px;display:flex;flex-direction:column;gap:16px}
textarea{
  width:100%;min-height:120px;padding:12px 14px;border-radius:10px;
  border:1px solid var(--border);background:var(--bg-input);color:var(--text);
  font-size:15px;line-height:1.5;resize:vertical;
}
button{
  align-self:flex-start;padding:10px 22px;border:none;border-radius:8px;
  background:var(--accent);color:#fff;font-size:15px;cursor:pointer;
}
button:hover{background:var(--accent-hover)}
button:disabled{opacity:.5;cursor:default}
.result{
  display:grid;grid-template-columns:140px 1fr;gap:8px 12px;
  padding:16px 18px;border-radius:12px;background:var(--bg-secondary);
  border:1px solid var(--border);font-size:15px;
}
.result dt{color:var(--text-muted)}
.error{color:var(--accent);font-size:14px;min-height:1em}
</style>
</head>
<body>
<div class="header">
  <h1><span>In</span>take</h1>
  <div class="status"><div class="status-dot" id="statusDot"></div><span id="statusText">loading</span></div>
</div>
<main>
  <textarea id="userInput" placeholder="Describe your request, e.g. &quot;Please update process 3 for customer 42&quot;"></textarea>
  <button id="submitBtn">Analyze</button>
  <div class="error" id="error"></div>
  <dl class="result">
    <dt>Action</dt><dd id="actionOutput">-</dd>
    <dt>Process</dt><dd id="processOutput">-</dd>
    <dt>Request Type</dt><dd id="requestTypeOutput">-</dd>
  </dl>
</main>
<script>
(function(){
  var input = document.getElementById('userInput');
  var button = document.getElementById('submitBtn');
  var errorBox = document.getElementById('error');

  function show(data){
    document.getElementById('actionOutput').textContent = data.action || 'Not Found';
    document.getElementById('processOutput').textContent = data.process || 'Not Found';
    document.getElementById('requestTypeOutput').textContent = data.requestType || 'Not Clear';
  }

  function analyze(){
    var text = input.value;
    errorBox.textContent = '';
    if (!text.trim()) { errorBox.textContent = 'Please enter a request.'; return; }
    button.disabled = true;
    fetch('/analyze', {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify({text: text})
    })
      .then(function(res){ return res.json().then(function(body){ return {ok: res.ok, body: body}; }); })
      .then(function(r){
        if (r.ok) { show(r.body); } else { errorBox.textContent = r.body.error || 'Request failed.'; }
      })
      .catch(function(){ errorBox.textContent = 'Error connecting to backend.'; })
      .then(function(){ button.disabled = false; });
  }

  function poll(){
    fetch('/api/status')
      .then(function(res){ return res.json(); })
      .then(function(s){
        document.getElementById('statusText').textContent = s.status + ' (' + s.model + ')';
        document.getElementById('statusDot').className = 'status-dot' + (s.status === 'ready' ? ' ready' : '');
        if (s.status !== 'ready') { setTimeout(poll, 2000); }
      })
      .catch(function(){ setTimeout(poll, 5000); });
  }

  button.addEventListener('click', analyze);
  input.addEventListener('keydown', function(e){
    if (e.key === 'Enter' && (e.ctrlKey || e.metaKey)) { analyze(); }
  });
  poll();
})();
</script>
</body>
</html>
"##;
