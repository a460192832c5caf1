mod scan_tests;
